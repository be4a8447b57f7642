use crate::features::error::{GpsError, IdentifyError, MetadataError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The primary error type for setting up a scanner.
#[derive(Error, Debug)]
pub enum BuildingScannerError {
    #[error("Metadata extractor initialization failed: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Identification service initialization failed: {0}")]
    Identify(#[from] IdentifyError),
}

/// Pipeline stage a scan was in when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Received,
    Extracting,
    GpsCheck,
    Identifying,
}

/// Stable failure tag, one per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum FailureKind {
    UploadAbsent,
    MetadataUnreadable,
    CoordinateMissing,
    IdentificationUnavailable,
}

/// Why a scan failed. The display text is the message shown to callers.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("No file uploaded (field name: photo)")]
    UploadAbsent,

    #[error("Failed to parse EXIF or read file")]
    MetadataUnreadable(#[source] MetadataError),

    #[error("No GPS EXIF data found in image")]
    CoordinateMissing(#[source] GpsError),

    #[error("Failed to fetch building info from the identification service")]
    IdentificationUnavailable(#[source] IdentifyError),
}

impl ScanError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::UploadAbsent => FailureKind::UploadAbsent,
            Self::MetadataUnreadable(_) => FailureKind::MetadataUnreadable,
            Self::CoordinateMissing(_) => FailureKind::CoordinateMissing,
            Self::IdentificationUnavailable(_) => FailureKind::IdentificationUnavailable,
        }
    }

    pub const fn stage(&self) -> ScanStage {
        match self {
            Self::UploadAbsent => ScanStage::Received,
            Self::MetadataUnreadable(_) => ScanStage::Extracting,
            Self::CoordinateMissing(_) => ScanStage::GpsCheck,
            Self::IdentificationUnavailable(_) => ScanStage::Identifying,
        }
    }

    /// HTTP status: 400 for problems with the upload itself, 500 otherwise.
    pub const fn status(&self) -> u16 {
        match self {
            Self::UploadAbsent | Self::CoordinateMissing(_) => 400,
            Self::MetadataUnreadable(_) | Self::IdentificationUnavailable(_) => 500,
        }
    }

    /// Text of the underlying cause, if any.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::UploadAbsent => None,
            Self::MetadataUnreadable(e) => Some(e.to_string()),
            Self::CoordinateMissing(e) => Some(e.to_string()),
            Self::IdentificationUnavailable(e) => Some(e.to_string()),
        }
    }
}
