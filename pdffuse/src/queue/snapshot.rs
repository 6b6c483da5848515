//! Immutable views of the queue.

use serde::Serialize;
use std::sync::Arc;

use crate::queue::document::QueuedDocument;
use crate::utils::format_file_size;

/// Frozen copy of the queue order at one point in time.
///
/// Snapshots are cheap to clone and never observe later mutations.
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    documents: Arc<[QueuedDocument]>,
}

impl QueueSnapshot {
    pub(crate) fn new(documents: &[QueuedDocument]) -> Self {
        Self {
            documents: Arc::from(documents),
        }
    }

    /// Documents in queue order.
    pub fn documents(&self) -> &[QueuedDocument] {
        &self.documents
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate documents in queue order.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedDocument> {
        self.documents.iter()
    }

    /// Total size of all queued documents.
    pub fn total_size(&self) -> u64 {
        self.documents.iter().map(QueuedDocument::size).sum()
    }

    /// Display rows with ordinal badges computed from the current position.
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.documents
            .iter()
            .enumerate()
            .map(|(index, doc)| QueueEntry {
                position: index + 1,
                key: doc.key().to_string(),
                name: doc.name().to_string(),
                size: doc.size(),
                size_label: format_file_size(doc.size()),
            })
            .collect()
    }
}

/// One row of the queue as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// 1-based position badge.
    pub position: usize,
    /// Stable row key.
    pub key: String,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Human-readable size.
    pub size_label: String,
}
