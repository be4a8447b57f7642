use crate::features::error::MetadataError;
use async_trait::async_trait;
use exiftool::ExifTool;
use serde_json::{Map, Value};
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Tag name to value, in the order the decoder reported them.
pub type TagMap = Map<String, Value>;

/// Decodes embedded metadata from the raw bytes of an uploaded photo.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    fn name(&self) -> &str;

    /// Returns every tag found in the photo.
    ///
    /// A well-formed image without a metadata block yields an empty map.
    /// Bytes that are not a readable image are an error.
    async fn extract(&self, bytes: &[u8]) -> Result<TagMap, MetadataError>;
}

/// In-process EXIF decoder backed by `kamadak-exif`.
///
/// Multi-part values (such as the degree/minute/second rationals of
/// `GPSLatitude`) come out as JSON arrays, single values as scalars.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifExtractor;

impl ExifExtractor {
    pub fn read_tags(bytes: &[u8]) -> Result<TagMap, MetadataError> {
        let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return Ok(TagMap::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(exif
            .fields()
            .filter(|field| field.ifd_num == exif::In::PRIMARY)
            .map(|field| (field.tag.to_string(), field_to_json(field)))
            .collect())
    }
}

#[async_trait]
impl MetadataExtractor for ExifExtractor {
    fn name(&self) -> &str {
        "exif"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<TagMap, MetadataError> {
        let bytes = bytes.to_vec();
        off_executor(move || Self::read_tags(&bytes)).await
    }
}

/// Runs decoder work on the blocking pool so it cannot stall other requests.
async fn off_executor<T, F>(work: F) -> Result<T, MetadataError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, MetadataError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MetadataError::Unavailable(format!("decoder task failed: {e}")))?
}

fn numbers<T: Copy + Into<f64>>(values: &[T]) -> Value {
    match values {
        [single] => Value::from(Into::<f64>::into(*single)),
        _ => values.iter().map(|v| Value::from(Into::<f64>::into(*v))).collect(),
    }
}

fn field_to_json(field: &exif::Field) -> Value {
    use exif::Value as V;
    match &field.value {
        V::Byte(v) => numbers(v),
        V::Short(v) => numbers(v),
        V::Long(v) => numbers(v),
        V::SByte(v) => numbers(v),
        V::SShort(v) => numbers(v),
        V::SLong(v) => numbers(v),
        V::Float(v) => numbers(v),
        V::Double(v) => numbers(v),
        V::Rational(v) => numbers(&v.iter().map(exif::Rational::to_f64).collect::<Vec<_>>()),
        V::SRational(v) => numbers(&v.iter().map(exif::SRational::to_f64).collect::<Vec<_>>()),
        V::Ascii(lines) => lines
            .first()
            .map(|line| {
                Value::String(
                    String::from_utf8_lossy(line)
                        .trim_end_matches('\0')
                        .to_string(),
                )
            })
            .unwrap_or(Value::Null),
        _ => Value::String(field.display_value().to_string()),
    }
}

/// Decoder that shells out to a long-running `exiftool` process.
///
/// Output is requested in numeric form (`-n`) and restricted to the EXIF
/// group, so `GPSLatitude` is the unsigned magnitude and the hemisphere comes
/// from `GPSLatitudeRef`, the same contract as [`ExifExtractor`].
pub struct ExifToolExtractor {
    exiftool: Arc<Mutex<ExifTool>>,
}

impl ExifToolExtractor {
    pub fn new(exiftool_path: Option<PathBuf>) -> Result<Self, MetadataError> {
        let exiftool = match exiftool_path {
            Some(path) => ExifTool::with_executable(&path)?,
            None => ExifTool::new()?,
        };
        Ok(Self {
            exiftool: Arc::new(Mutex::new(exiftool)),
        })
    }

    fn read_tags(exiftool: &Mutex<ExifTool>, bytes: &[u8]) -> Result<TagMap, MetadataError> {
        // exiftool only reads from disk.
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;

        let output = {
            let mut exiftool = exiftool
                .lock()
                .map_err(|_| MetadataError::Unavailable("exiftool lock poisoned".to_string()))?;
            exiftool.json(file.path(), &["-n", "-EXIF:all"])?
        };

        match output {
            Value::Object(mut tags) => {
                if let Some(error) = tags.get("Error").and_then(Value::as_str) {
                    return Err(MetadataError::Unreadable(error.to_string()));
                }
                tags.remove("SourceFile");
                Ok(tags)
            }
            other => Err(MetadataError::Unreadable(format!(
                "unexpected exiftool output: {other}"
            ))),
        }
    }
}

#[async_trait]
impl MetadataExtractor for ExifToolExtractor {
    fn name(&self) -> &str {
        "exiftool"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<TagMap, MetadataError> {
        let exiftool = Arc::clone(&self.exiftool);
        let bytes = bytes.to_vec();
        off_executor(move || Self::read_tags(&exiftool, &bytes)).await
    }
}
