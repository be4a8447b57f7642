//! Identification service adapters.
//!
//! An [`Identifier`] turns a position (and optionally a compressed copy of
//! the photo) into a free-text reply that is expected to hold a JSON object
//! describing the building.

pub mod openai;

use crate::features::error::IdentifyError;
use crate::features::gps::Coordinates;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiIdentifier;

/// Which payload the scan sends to the identification service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifyMode {
    /// Coordinates only.
    #[default]
    Text,
    /// Coordinates plus a downscaled JPEG of the photo.
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifyRequest {
    pub coordinates: Coordinates,
    /// `data:image/jpeg;base64,...` when the photo is attached.
    pub image_data_url: Option<String>,
}

impl IdentifyRequest {
    pub fn prompt(&self) -> String {
        let Coordinates {
            latitude,
            longitude,
        } = self.coordinates;
        if self.image_data_url.is_some() {
            format!(
                "This photo was taken at coordinates: {latitude}, {longitude}. Identify the \
                 building in the photo. Return a JSON object with keys: name, address, \
                 building_type (e.g., residential, office, landmark), year_built, architect, \
                 floor_count, height, description (short), data_source, and facts (a list of at \
                 most 5 short notable facts). If unknown, use null. Respond ONLY with JSON."
            )
        } else {
            format!(
                "I have coordinates: {latitude}, {longitude}. Return a JSON object with keys: \
                 name, address, building_type (e.g., residential, office, landmark), year_built \
                 (if known), architect, floor_count, height, description (short), and \
                 data_source. If unknown, use null. Respond ONLY with JSON."
            )
        }
    }
}

#[async_trait]
pub trait Identifier: Send + Sync {
    fn name(&self) -> &str;

    /// Asks the service about the building at the requested position.
    ///
    /// The reply text is returned untouched; interpreting it is up to the
    /// caller. An empty reply is not an error.
    async fn describe(&self, request: IdentifyRequest) -> Result<String, IdentifyError>;
}
