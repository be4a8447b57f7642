//! # Building Scanner
//!
//! Identify the building in a photo from the GPS position embedded in its metadata.
//!
//! An upload goes through a fixed pipeline: the metadata is decoded, the GPS
//! latitude and longitude are normalized to signed decimal degrees, an
//! identification service is asked what stands at that position, and its
//! reply is interpreted into a structured description.
//!
//! ## Key Features
//!
//! - **Metadata**: Reads EXIF tags in-process, or through `exiftool`.
//! - **Coordinates**: Accepts decimal, degree/minute/second and keyed encodings of GPS values.
//! - **Identification**: Asks an OpenAI-compatible chat model, with or without a compressed copy of the photo.
//! - **Cleanup**: Transient upload storage is released on every outcome, including panics.
//!
//! ## Usage
//!
//! Build a `Scanner` with a metadata extractor and an identifier, then hand it uploads.
//!
//! ```rust,no_run
//! use building_scanner::{ExifExtractor, OpenAiIdentifier, ScanOutcome, Scanner, UploadedPhoto};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let identifier = OpenAiIdentifier::builder()
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .build()?;
//!     let scanner = Scanner::builder()
//!         .extractor(Box::new(ExifExtractor))
//!         .identifier(Box::new(identifier))
//!         .build();
//!
//!     let photo = UploadedPhoto::from_bytes(std::fs::read("assets/street.jpg")?);
//!     match scanner.scan(Some(photo)).await {
//!         ScanOutcome::Success(success) => println!("{}", serde_json::to_string_pretty(&success)?),
//!         ScanOutcome::Failure(failure) => eprintln!("{}", failure.message),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod identify;
pub mod scanner;
pub mod server;
pub mod structs;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use config::{Config, MetadataBackend};
pub use error::{BuildingScannerError, FailureKind, ScanError, ScanStage};
pub use features::building::{BuildingDescription, BuildingDetails};
pub use features::coordinate::{GeoComponent, Hemisphere, RawGeoValue, normalize};
pub use features::gps::{Coordinates, get_coordinates};
pub use features::metadata::{ExifExtractor, ExifToolExtractor, MetadataExtractor, TagMap};
pub use identify::{IdentifyMode, IdentifyRequest, Identifier, OpenAiIdentifier};
pub use scanner::Scanner;
pub use structs::{ScanFailure, ScanOutcome, ScanSuccess};
pub use upload::UploadedPhoto;
