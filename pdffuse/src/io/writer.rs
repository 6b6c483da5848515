//! Byte-buffer writing with atomic replace.
//!
//! This module provides safe output writing with:
//! - Atomic writes (write to a sibling temp file, then rename)
//! - Buffered writes on the blocking pool
//! - Existence checks
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdffuse::io::writer::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.write(&bytes, Path::new("merged-document.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfFuseError, Result};
use crate::utils::format_file_size;

/// Options for writing output files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Output writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes (faster but less safe).
    pub fn non_atomic() -> Self {
        Self::with_options(WriteOptions {
            atomic: false,
            ..Default::default()
        })
    }

    /// Write `bytes` to `path` and return statistics about the operation.
    ///
    /// With atomic writes enabled a reader never observes a half-written
    /// file at `path`; a failed write leaves any previous file in place.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory doesn't exist
    /// - Insufficient permissions
    /// - Disk full
    /// - Write operation fails
    pub async fn write(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();
        let bytes = bytes.to_vec();

        task::spawn_blocking(move || write_blocking(&bytes, path_buf, &options))
            .await
            .map_err(|e| PdfFuseError::other(format!("Write task failed: {e}")))?
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

fn write_blocking(bytes: &[u8], path: PathBuf, options: &WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();

    let write_path = if options.atomic {
        temp_path_for(&path)
    } else {
        path.clone()
    };

    let written = write_file(bytes, &write_path, options.buffer_size);
    if let Err(err) = written {
        if options.atomic {
            let _ = std::fs::remove_file(&write_path);
        }
        return Err(err);
    }

    if options.atomic {
        std::fs::rename(&write_path, &path).map_err(|e| {
            let _ = std::fs::remove_file(&write_path);
            PdfFuseError::FailedToWrite {
                path: path.clone(),
                source: e,
            }
        })?;
    }

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size: bytes.len() as u64,
        output_path: path,
    })
}

fn write_file(bytes: &[u8], path: &Path, buffer_size: usize) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| PdfFuseError::FailedToCreateOutput {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(buffer_size, file);
    let to_write_error = |e| PdfFuseError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    };

    writer.write_all(bytes).map_err(to_write_error)?;
    writer.flush().map_err(to_write_error)?;
    writer.get_ref().sync_all().map_err(to_write_error)?;

    Ok(())
}

/// Sibling temp path: `out.pdf` becomes `out.pdf.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
