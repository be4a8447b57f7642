use crate::error::ScanError;
use crate::features::building::BuildingDescription;
use crate::features::data_url::bytes_to_data_url;
use crate::features::error::IdentifyError;
use crate::features::gps::{Coordinates, get_coordinates};
use crate::features::metadata::{MetadataExtractor, TagMap};
use crate::identify::{IdentifyMode, IdentifyRequest, Identifier};
use crate::structs::{ScanOutcome, ScanSuccess};
use crate::upload::UploadedPhoto;
use bon::bon;
use std::time::Duration;

/// The scan pipeline: metadata, GPS check, identification, interpretation.
///
/// Holds its collaborators and configuration; it keeps no per-request state
/// and can be shared across concurrent requests.
///
/// ```rust,no_run
/// # use building_scanner::{Scanner, ExifExtractor, OpenAiIdentifier, BuildingScannerError};
/// # fn main() -> Result<(), BuildingScannerError> {
/// let scanner = Scanner::builder()
///     .extractor(Box::new(ExifExtractor))
///     .identifier(Box::new(OpenAiIdentifier::builder().build()?))
///     .build();
/// # Ok(())
/// # }
/// ```
pub struct Scanner {
    extractor: Box<dyn MetadataExtractor>,
    identifier: Box<dyn Identifier>,
    mode: IdentifyMode,
    identify_timeout: Duration,
    image_max_dimension: u32,
}

#[bon]
impl Scanner {
    /// Constructs a `Scanner` via a builder pattern.
    ///
    /// # Builder Arguments
    ///
    /// * `extractor` - Decoder that turns photo bytes into a tag map.
    /// * `identifier` - Identification service binding.
    /// * `mode` - (Default: `Text`) Whether a compressed copy of the photo is sent along.
    /// * `identify_timeout` - (Default: 60 s) Upper bound on the identification call.
    /// * `image_max_dimension` - (Default: `1024`) Longest side of the attached photo, in pixels.
    #[builder]
    pub fn new(
        extractor: Box<dyn MetadataExtractor>,
        identifier: Box<dyn Identifier>,
        #[builder(default)] mode: IdentifyMode,
        #[builder(default = Duration::from_secs(60))] identify_timeout: Duration,
        #[builder(default = 1024)] image_max_dimension: u32,
    ) -> Self {
        Self {
            extractor,
            identifier,
            mode,
            identify_timeout,
            image_max_dimension,
        }
    }

    pub const fn mode(&self) -> IdentifyMode {
        self.mode
    }

    /// Runs one scan to completion.
    ///
    /// Takes ownership of the upload; its transient storage is released before
    /// this returns, whatever the outcome. Every failure is mapped to a
    /// [`ScanOutcome::Failure`]; nothing is propagated.
    pub async fn scan(&self, photo: Option<UploadedPhoto>) -> ScanOutcome {
        let outcome = ScanOutcome::from(self.run(photo).await);
        match &outcome {
            ScanOutcome::Success(success) => tracing::info!(
                latitude = success.latitude,
                longitude = success.longitude,
                structured = success.building.is_structured(),
                "scan completed"
            ),
            ScanOutcome::Failure(failure) if failure.status >= 500 => tracing::error!(
                stage = ?failure.stage,
                details = failure.details.as_deref().unwrap_or_default(),
                "{}",
                failure.message
            ),
            ScanOutcome::Failure(failure) => tracing::info!(
                stage = ?failure.stage,
                details = failure.details.as_deref().unwrap_or_default(),
                "{}",
                failure.message
            ),
        }
        outcome
    }

    /// Reads every metadata tag of an upload without identifying anything.
    pub async fn extract_tags(&self, photo: Option<UploadedPhoto>) -> Result<TagMap, ScanError> {
        let photo = photo.ok_or(ScanError::UploadAbsent)?;
        let bytes = photo
            .read()
            .await
            .map_err(|e| ScanError::MetadataUnreadable(e.into()))?;
        self.extractor
            .extract(&bytes)
            .await
            .map_err(ScanError::MetadataUnreadable)
    }

    async fn run(&self, photo: Option<UploadedPhoto>) -> Result<ScanSuccess, ScanError> {
        // --- Received ---
        let photo = photo.ok_or(ScanError::UploadAbsent)?;
        tracing::debug!(
            size = photo.size(),
            file_name = photo.file_name().unwrap_or_default(),
            "photo received"
        );
        let bytes = photo
            .read()
            .await
            .map_err(|e| ScanError::MetadataUnreadable(e.into()))?;

        // --- Extracting ---
        let tags = self
            .extractor
            .extract(&bytes)
            .await
            .map_err(ScanError::MetadataUnreadable)?;
        tracing::debug!(
            extractor = self.extractor.name(),
            tag_count = tags.len(),
            latitude = ?tags.get("GPSLatitude"),
            longitude = ?tags.get("GPSLongitude"),
            "metadata extracted"
        );

        // --- GPS check ---
        let coordinates = get_coordinates(&tags).map_err(ScanError::CoordinateMissing)?;

        // --- Identifying ---
        let request = IdentifyRequest {
            coordinates,
            image_data_url: self.attachment(&bytes).await,
        };
        let reply = tokio::time::timeout(self.identify_timeout, self.identifier.describe(request))
            .await
            .map_err(|_| IdentifyError::Timeout(self.identify_timeout))
            .and_then(|reply| reply)
            .map_err(ScanError::IdentificationUnavailable)?;

        // --- Completed ---
        let building = BuildingDescription::from_reply(&reply);
        if !building.is_structured() {
            tracing::debug!(identifier = self.identifier.name(), "reply was not structured, keeping raw text");
        }

        let Coordinates {
            latitude,
            longitude,
        } = coordinates;
        Ok(ScanSuccess {
            latitude,
            longitude,
            building,
        })
    }

    /// Compressed photo for image mode. Falls back to a text-only request
    /// when the photo cannot be re-encoded.
    ///
    /// Decoding and resizing run on the blocking pool.
    async fn attachment(&self, bytes: &[u8]) -> Option<String> {
        if self.mode != IdentifyMode::Image {
            return None;
        }
        let bytes = bytes.to_vec();
        let max_dimension = self.image_max_dimension;
        match tokio::task::spawn_blocking(move || bytes_to_data_url(&bytes, max_dimension)).await {
            Ok(Ok(data_url)) => Some(data_url),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "could not compress photo, sending coordinates only");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "photo compression task failed, sending coordinates only");
                None
            }
        }
    }
}
