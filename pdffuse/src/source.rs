//! Raw file handles offered to the queue.
//!
//! A [`SourceFile`] carries the same facts a browser `File` exposes: a name,
//! a declared media type, a size and a last-modified time. Its bytes are
//! only read when a merge needs them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{PdfFuseError, Result};

/// Media type accepted by the queue.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

const EXTENSION_MEDIA_TYPES: &[(&str, &str)] = &[
    ("pdf", PDF_MEDIA_TYPE),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("txt", "text/plain"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

/// Derive the declared media type of a path from its extension.
///
/// Matching is case-insensitive. Unknown extensions declare no type, the
/// way a browser reports an empty `File.type`.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_MEDIA_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| *media_type)
}

/// Where the bytes of a [`SourceFile`] live.
#[derive(Debug, Clone)]
pub enum SourceContent {
    /// Read from disk when needed.
    Path(PathBuf),
    /// Already in memory.
    Memory(Arc<[u8]>),
}

/// A candidate file handle.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    media_type: Option<String>,
    size: u64,
    last_modified: SystemTime,
    content: SourceContent,
}

impl SourceFile {
    /// Open a handle to a file on disk.
    ///
    /// Only metadata is read here; the content stays on disk until a merge
    /// asks for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or is not a regular file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(PdfFuseError::file_not_found(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };

        if !metadata.is_file() {
            return Err(PdfFuseError::not_a_file(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            media_type: media_type_for_path(path).map(str::to_string),
            size: metadata.len(),
            last_modified: metadata.modified().unwrap_or(UNIX_EPOCH),
            content: SourceContent::Path(path.to_path_buf()),
        })
    }

    /// Build a handle around bytes that are already in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: Option<&str>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            media_type: media_type.map(str::to_string),
            size: bytes.len() as u64,
            last_modified: SystemTime::now(),
            content: SourceContent::Memory(bytes),
        }
    }

    /// Override the last-modified time.
    pub fn with_last_modified(mut self, last_modified: SystemTime) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// File name shown to the user.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type, if any.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Whether the declared media type is the accepted document type.
    pub fn is_pdf(&self) -> bool {
        self.media_type() == Some(PDF_MEDIA_TYPE)
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last-modified time.
    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    /// Last-modified time in milliseconds since the Unix epoch.
    pub fn last_modified_millis(&self) -> u64 {
        self.last_modified
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Where the content lives.
    pub fn content(&self) -> &SourceContent {
        &self.content
    }

    /// Read the raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFuseError::FailedToReadSource`] if the file cannot be read.
    pub async fn read_bytes(&self) -> Result<Arc<[u8]>> {
        match &self.content {
            SourceContent::Memory(bytes) => Ok(Arc::clone(bytes)),
            SourceContent::Path(path) => tokio::fs::read(path)
                .await
                .map(Arc::from)
                .map_err(|source| PdfFuseError::FailedToReadSource {
                    name: self.name.clone(),
                    source,
                }),
        }
    }
}
