//! Error types for pdffuse.
//!
//! This module defines all error types that can occur while queueing,
//! merging and delivering PDF documents. Errors are designed to be
//! informative and actionable, providing clear context about what went
//! wrong and how to fix it.
//!
//! # Error Categories
//!
//! - **Intake Errors**: rejected media types, out-of-range queue positions
//! - **Decode Errors**: invalid PDF structure, encrypted or unreadable input
//! - **Merge Errors**: re-entrant requests, empty queues, page tree failures
//! - **Delivery Errors**: output already exists, write failures

use std::io;
use std::path::PathBuf;

/// Result type alias for pdffuse operations.
pub type Result<T> = std::result::Result<T, PdfFuseError>;

/// Main error type for pdffuse operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfFuseError {
    /// A candidate file does not declare the accepted media type.
    ///
    /// Intake drops such files silently; the variant exists so adapters can
    /// report rejected candidates if they choose to.
    #[error("Unsupported file type for {name}: {media_type}")]
    InvalidType {
        /// Name of the rejected file.
        name: String,
        /// Declared media type, or `unknown`.
        media_type: String,
    },

    /// Document bytes could not be decoded as a PDF.
    #[error("Failed to decode PDF: {name}\n  Reason: {reason}")]
    DecodeFailed {
        /// Name of the offending document.
        name: String,
        /// Reason reported by the document library.
        reason: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {name}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools"
    )]
    EncryptedPdf {
        /// Name of the encrypted document.
        name: String,
    },

    /// The raw bytes of a queued document could not be read.
    #[error("Failed to read document: {name}\n  Reason: {source}")]
    FailedToReadSource {
        /// Name of the document.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A merge was requested while another merge is still processing.
    #[error("A merge is already in progress")]
    ReentrancyRejected,

    /// No documents were provided for merging.
    #[error("No documents queued for merging")]
    NoFilesToMerge,

    /// Fewer documents are queued than the merge gate requires.
    #[error("At least {required} documents are required to merge, {queued} queued")]
    NotEnoughDocuments {
        /// Minimum number of documents.
        required: usize,
        /// Number of documents currently queued.
        queued: usize,
    },

    /// A queue position is outside the current bounds.
    #[error("Position {index} is out of bounds for a queue of {len} document(s)")]
    IndexOutOfBounds {
        /// Requested zero-based index.
        index: usize,
        /// Current queue length.
        len: usize,
    },

    /// Input path was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The merged document could not be serialized.
    #[error("Failed to serialize merged document: {reason}")]
    SerializeFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Failed to read input list file.
    #[error("Failed to read input list file: {}\n  Reason: {source}", .path.display())]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Input list file contains invalid entries.
    #[error(
        "Invalid entry in input list file: {} at line {line_number}\n  Details: {details}",
        .path.display()
    )]
    InvalidInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// Merge operation failed while assembling the output page tree.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Metadata operation failed.
    #[error("Failed to set metadata: {reason}")]
    MetadataFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for PdfFuseError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfFuseError {
    /// Create an InvalidType error.
    pub fn invalid_type(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self::InvalidType {
            name: name.into(),
            media_type: media_type.into(),
        }
    }

    /// Create a DecodeFailed error.
    pub fn decode_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(name: impl Into<String>) -> Self {
        Self::EncryptedPdf { name: name.into() }
    }

    /// Create an IndexOutOfBounds error.
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is swallowed by the session instead of surfaced.
    ///
    /// Rejected media types and re-entrant merge requests are expected user
    /// behavior, not failures.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::InvalidType { .. } | Self::ReentrancyRejected)
    }

    /// Check if this error aborts an in-flight merge.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::DecodeFailed { .. } | Self::EncryptedPdf { .. } | Self::FailedToReadSource { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoFilesToMerge
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidType { .. } => 1,
            Self::DecodeFailed { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::FailedToReadSource { .. } => 2,
            Self::ReentrancyRejected => 1,
            Self::NoFilesToMerge => 1,
            Self::NotEnoughDocuments { .. } => 1,
            Self::IndexOutOfBounds { .. } => 1,
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::SerializeFailed { .. } => 6,
            Self::FailedToReadInputList { .. } => 2,
            Self::InvalidInputList { .. } => 1,
            Self::MergeFailed { .. } => 6,
            Self::MetadataFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
