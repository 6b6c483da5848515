//! Queued documents and their display keys.

use serde::Serialize;
use std::fmt;

use crate::source::SourceFile;

/// Stable key for a queued document.
///
/// Built from the file name, its last-modified time and the ordinal at which
/// it entered the queue. Keys only identify list rows; two uploads of the
/// same file are still two documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentKey {
    name: String,
    last_modified: u64,
    ordinal: u64,
}

impl DocumentKey {
    pub(crate) fn new(file: &SourceFile, ordinal: u64) -> Self {
        Self {
            name: file.name().to_string(),
            last_modified: file.last_modified_millis(),
            ordinal,
        }
    }

    /// Ordinal assigned at insertion.
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.last_modified, self.ordinal)
    }
}

/// A document waiting in the queue.
#[derive(Debug, Clone)]
pub struct QueuedDocument {
    key: DocumentKey,
    file: SourceFile,
}

impl QueuedDocument {
    pub(crate) fn new(file: SourceFile, ordinal: u64) -> Self {
        Self {
            key: DocumentKey::new(&file, ordinal),
            file,
        }
    }

    /// Display key.
    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// Underlying file handle.
    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    /// File name.
    pub fn name(&self) -> &str {
        self.file.name()
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.file.size()
    }
}
