use std::time::Duration;

use thiserror::Error;

use crate::features::gps::Axis;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("I/O error while reading the photo: {0}")]
    Io(#[from] std::io::Error),

    #[error("EXIF decoding failed: {0}")]
    Exif(#[from] exif::Error),

    #[error("Exiftool failed to execute or process the file")]
    Exiftool(#[from] exiftool::ExifToolError),

    #[error("Exiftool could not read the file: {0}")]
    Unreadable(String),

    #[error("Metadata extractor is unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum GpsError {
    #[error("Missing GPS tag: {0}")]
    MissingTag(&'static str),

    #[error("{0} value has an unrecognized encoding")]
    Unrepresentable(Axis),

    #[error("{axis} {value} is outside the valid range")]
    OutOfRange { axis: Axis, value: f64 },
}

#[derive(Error, Debug)]
pub enum IdentifyError {
    #[error("No API key configured for the identification service")]
    MissingApiKey,

    #[error("Request to the identification service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identification service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode the identification service response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Identification service did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum DataUrlError {
    #[error("Photo could not be decoded or re-encoded: {0}")]
    Image(#[from] image::ImageError),
}
