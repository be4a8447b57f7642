use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The bytes of one uploaded photo, owned for the duration of one scan.
///
/// A photo spooled to transient storage is removed when the handle is
/// dropped, on success, on failure and while unwinding. Removal happens
/// exactly once; a failure to remove is logged and otherwise ignored.
#[derive(Debug)]
pub struct UploadedPhoto {
    storage: Storage,
    size: usize,
    file_name: Option<String>,
}

#[derive(Debug)]
enum Storage {
    TempFile(Option<NamedTempFile>),
    Memory(Vec<u8>),
}

impl UploadedPhoto {
    pub fn from_temp_file(file: NamedTempFile, size: usize) -> Self {
        Self {
            storage: Storage::TempFile(Some(file)),
            size,
            file_name: None,
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            size: bytes.len(),
            storage: Storage::Memory(bytes),
            file_name: None,
        }
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }

    /// Declared size in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Location of the transient file, if the photo was spooled to disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::TempFile(Some(file)) => Some(file.path()),
            _ => None,
        }
    }

    pub async fn read(&self) -> io::Result<Cow<'_, [u8]>> {
        match &self.storage {
            Storage::TempFile(Some(file)) => tokio::fs::read(file.path()).await.map(Cow::Owned),
            Storage::TempFile(None) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "uploaded file was already released",
            )),
            Storage::Memory(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }

    fn release(&mut self) {
        let Storage::TempFile(slot) = &mut self.storage else {
            return;
        };
        let Some(file) = slot.take() else {
            return;
        };
        let path: PathBuf = file.path().to_path_buf();
        match file.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "released uploaded file"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove uploaded file");
            }
        }
    }
}

impl Drop for UploadedPhoto {
    fn drop(&mut self) {
        self.release();
    }
}
