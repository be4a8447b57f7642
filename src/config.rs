use crate::error::BuildingScannerError;
use crate::features::metadata::{ExifExtractor, ExifToolExtractor, MetadataExtractor};
use crate::identify::{IdentifyMode, OpenAiIdentifier};
use crate::scanner::Scanner;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Which decoder reads metadata from uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MetadataBackend {
    /// In-process EXIF decoder.
    #[default]
    Exif,
    /// External `exiftool` process.
    Exiftool,
}

/// Identify the building in a photo from its GPS metadata.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// API key for the identification service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Model used for identification
    #[arg(long, env = "OPENAI_MODEL", default_value = OpenAiIdentifier::DEFAULT_MODEL)]
    pub openai_model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = OpenAiIdentifier::DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Token limit for each identification reply
    #[arg(long, env = "OPENAI_MAX_TOKENS", default_value_t = OpenAiIdentifier::DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Send coordinates only, or coordinates plus a compressed photo
    #[arg(long, env = "IDENTIFY_MODE", value_enum, default_value_t = IdentifyMode::Text)]
    pub identify_mode: IdentifyMode,

    /// Seconds to wait for the identification service
    #[arg(long, env = "IDENTIFY_TIMEOUT_SECS", default_value_t = 60)]
    pub identify_timeout_secs: u64,

    /// Metadata decoder
    #[arg(long, env = "METADATA_BACKEND", value_enum, default_value_t = MetadataBackend::Exif)]
    pub metadata_backend: MetadataBackend,

    /// Path to the exiftool executable (searched in PATH when unset)
    #[arg(long, env = "EXIFTOOL_PATH")]
    pub exiftool_path: Option<PathBuf>,

    /// Longest side, in pixels, of the photo attached in image mode
    #[arg(long, env = "IMAGE_MAX_DIMENSION", default_value_t = 1024)]
    pub image_max_dimension: u32,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn build_extractor(&self) -> Result<Box<dyn MetadataExtractor>, BuildingScannerError> {
        Ok(match self.metadata_backend {
            MetadataBackend::Exif => Box::new(ExifExtractor),
            MetadataBackend::Exiftool => {
                Box::new(ExifToolExtractor::new(self.exiftool_path.clone())?)
            }
        })
    }

    pub fn build_identifier(&self) -> Result<OpenAiIdentifier, BuildingScannerError> {
        Ok(OpenAiIdentifier::builder()
            .maybe_api_key(self.openai_api_key.clone())
            .base_url(self.openai_base_url.clone())
            .model(self.openai_model.clone())
            .max_tokens(self.max_tokens)
            .build()?)
    }

    pub fn build_scanner(&self) -> Result<Scanner, BuildingScannerError> {
        let identifier = self.build_identifier()?;
        if !identifier.has_api_key() {
            tracing::warn!("no OPENAI_API_KEY configured, every scan will fail at identification");
        }
        Ok(Scanner::builder()
            .extractor(self.build_extractor()?)
            .identifier(Box::new(identifier))
            .mode(self.identify_mode)
            .identify_timeout(Duration::from_secs(self.identify_timeout_secs))
            .image_max_dimension(self.image_max_dimension)
            .build())
    }
}
