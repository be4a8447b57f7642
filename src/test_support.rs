//! Test doubles for the scanner's collaborators.

use crate::features::error::{IdentifyError, MetadataError};
use crate::features::metadata::{MetadataExtractor, TagMap};
use crate::identify::{IdentifyRequest, Identifier};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::upload::UploadedPhoto;

/// Returns the same tags for any input.
pub struct StubExtractor(pub TagMap);

impl StubExtractor {
    pub fn new(tags: Value) -> Self {
        match tags {
            Value::Object(map) => Self(map),
            _ => panic!("stub tags must be an object"),
        }
    }
}

#[async_trait]
impl MetadataExtractor for StubExtractor {
    fn name(&self) -> &str {
        "stub"
    }

    async fn extract(&self, _bytes: &[u8]) -> Result<TagMap, MetadataError> {
        Ok(self.0.clone())
    }
}

pub enum Reply {
    Text(String),
    Fail,
    Hang,
    Panic,
}

/// Answers every request with a canned reply and records what it was sent.
pub struct StubIdentifier {
    reply: Reply,
    pub requests: Arc<Mutex<Vec<IdentifyRequest>>>,
}

impl StubIdentifier {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Arc::default(),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(Reply::Text(text.to_string()))
    }
}

#[async_trait]
impl Identifier for StubIdentifier {
    fn name(&self) -> &str {
        "stub"
    }

    async fn describe(&self, request: IdentifyRequest) -> Result<String, IdentifyError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(IdentifyError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
            Reply::Panic => panic!("identification service exploded"),
        }
    }
}

pub fn gps_tags() -> Value {
    serde_json::json!({
        "Make": "Google",
        "GPSLatitude": [40, 30, 0],
        "GPSLatitudeRef": "N",
        "GPSLongitude": [73, 59, 0],
        "GPSLongitudeRef": "W"
    })
}

/// A photo spooled to a real temp file, plus the path to check cleanup.
pub fn temp_photo(contents: &[u8]) -> (UploadedPhoto, std::path::PathBuf) {
    use std::io::Write;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    let path = file.path().to_path_buf();
    (UploadedPhoto::from_temp_file(file, contents.len()), path)
}
