//! Handing merged output to the user.
//!
//! A [`Delivery`] receives the serialized document, its media type and the
//! file name the user should see. [`FileDelivery`] writes it to a directory;
//! [`MemoryDelivery`] keeps it for callers that embed the library.

use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::{Config, OverwriteMode};
use crate::error::{PdfFuseError, Result};
use crate::io::writer::PdfWriter;

/// Where a delivered document ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    /// Location of the artifact (a path for files).
    pub location: String,
    /// Bytes delivered.
    pub bytes_written: u64,
}

/// Produces the user-facing artifact for a merged document.
pub trait Delivery {
    /// Deliver `bytes` of type `media_type` under `filename`.
    fn deliver(
        &self,
        bytes: &[u8],
        media_type: &str,
        filename: &str,
    ) -> impl Future<Output = Result<DeliveryReceipt>>;
}

/// Writes merged documents into a directory.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    directory: PathBuf,
    overwrite: bool,
    writer: PdfWriter,
}

impl FileDelivery {
    /// Deliver into `directory`; existing files are replaced only when
    /// `overwrite` is set.
    pub fn new(directory: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            directory: directory.into(),
            overwrite,
            writer: PdfWriter::new(),
        }
    }

    /// Delivery into the configured output directory.
    ///
    /// Only [`OverwriteMode::Force`] replaces an existing file. The prompt
    /// decision for [`OverwriteMode::Prompt`] is taken before delivery, so
    /// callers that confirmed should pass a config with `Force`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.output_dir(),
            config.overwrite_mode == OverwriteMode::Force,
        )
    }

    /// Target directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path a file named `filename` is delivered to.
    pub fn target_path(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }
}

impl Delivery for FileDelivery {
    async fn deliver(
        &self,
        bytes: &[u8],
        media_type: &str,
        filename: &str,
    ) -> Result<DeliveryReceipt> {
        let path = self.target_path(filename);

        if !self.overwrite && self.writer.exists(&path).await {
            return Err(PdfFuseError::output_exists(path));
        }

        let stats = self.writer.write(bytes, &path).await?;
        tracing::info!(
            path = %stats.output_path.display(),
            media_type,
            size = %stats.format_file_size(),
            "delivered merged document"
        );

        Ok(DeliveryReceipt {
            location: stats.output_path.display().to_string(),
            bytes_written: stats.file_size,
        })
    }
}

/// A document held by [`MemoryDelivery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredDocument {
    /// File name it was delivered under.
    pub filename: String,
    /// Declared media type.
    pub media_type: String,
    /// Content.
    pub bytes: Vec<u8>,
}

/// Keeps delivered documents in memory.
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    delivered: Mutex<Vec<DeliveredDocument>>,
}

impl MemoryDelivery {
    /// Empty delivery sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first.
    pub fn delivered(&self) -> Vec<DeliveredDocument> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Delivery for MemoryDelivery {
    async fn deliver(
        &self,
        bytes: &[u8],
        media_type: &str,
        filename: &str,
    ) -> Result<DeliveryReceipt> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DeliveredDocument {
                filename: filename.to_string(),
                media_type: media_type.to_string(),
                bytes: bytes.to_vec(),
            });

        Ok(DeliveryReceipt {
            location: filename.to_string(),
            bytes_written: bytes.len() as u64,
        })
    }
}
