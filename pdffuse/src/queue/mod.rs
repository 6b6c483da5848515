//! Intake and ordering of documents waiting to be merged.
//!
//! The [`DocumentQueue`] is the only mutable state of a merge session. It
//! changes through three operations:
//! - [`append`](DocumentQueue::append) a batch of candidates, keeping PDFs only
//! - [`reorder`](DocumentQueue::reorder) one document to a new position
//! - [`remove`](DocumentQueue::remove) one document by position
//!
//! Every successful mutation publishes a fresh [`QueueSnapshot`] on a
//! `tokio::sync::watch` channel.
//!
//! # Examples
//!
//! ```
//! use pdffuse::queue::DocumentQueue;
//! use pdffuse::source::{PDF_MEDIA_TYPE, SourceFile};
//!
//! let mut queue = DocumentQueue::new();
//! let report = queue.append(vec![
//!     SourceFile::from_bytes("a.pdf", Some(PDF_MEDIA_TYPE), vec![0u8; 8]),
//!     SourceFile::from_bytes("notes.txt", Some("text/plain"), vec![0u8; 8]),
//! ]);
//! assert_eq!(report.accepted, 1);
//! assert_eq!(queue.len(), 1);
//! ```

pub mod document;
pub mod snapshot;

pub use document::{DocumentKey, QueuedDocument};
pub use snapshot::{QueueEntry, QueueSnapshot};

use serde::Serialize;
use tokio::sync::watch;

use crate::error::{PdfFuseError, Result};
use crate::source::SourceFile;

/// Outcome of an intake batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntakeReport {
    /// Candidates appended to the queue.
    pub accepted: usize,
    /// Candidates dropped because of their media type.
    pub rejected: usize,
}

/// Ordered, mutable collection of documents pending merge.
#[derive(Debug)]
pub struct DocumentQueue {
    items: Vec<QueuedDocument>,
    next_ordinal: u64,
    snapshots: watch::Sender<QueueSnapshot>,
}

impl DocumentQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(QueueSnapshot::default());
        Self {
            items: Vec::new(),
            next_ordinal: 0,
            snapshots,
        }
    }

    /// Append a batch of candidates.
    ///
    /// Candidates that do not declare `application/pdf` are dropped without
    /// an error. When nothing survives the filter the queue is left alone
    /// and no snapshot is published.
    pub fn append<I>(&mut self, candidates: I) -> IntakeReport
    where
        I: IntoIterator<Item = SourceFile>,
    {
        let mut report = IntakeReport::default();
        let mut accepted = Vec::new();

        for candidate in candidates {
            if candidate.is_pdf() {
                accepted.push(candidate);
            } else {
                report.rejected += 1;
                tracing::debug!(
                    name = candidate.name(),
                    media_type = candidate.media_type().unwrap_or("unknown"),
                    "dropping candidate with unsupported media type"
                );
            }
        }

        if accepted.is_empty() {
            return report;
        }

        report.accepted = accepted.len();
        for file in accepted {
            let doc = QueuedDocument::new(file, self.next_ordinal);
            self.next_ordinal += 1;
            self.items.push(doc);
        }

        tracing::debug!(
            accepted = report.accepted,
            queued = self.items.len(),
            "appended documents"
        );
        self.publish();
        report
    }

    /// Move one document from `from` to `to`.
    ///
    /// A missing target (dropped outside the list) or `from == to` is a
    /// no-op. Returns whether the order changed.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFuseError::IndexOutOfBounds`] if either position is
    /// outside the queue. The queue is left unchanged.
    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> Result<bool> {
        let Some(to) = to else {
            return Ok(false);
        };

        let len = self.items.len();
        if from >= len {
            return Err(PdfFuseError::index_out_of_bounds(from, len));
        }
        if to >= len {
            return Err(PdfFuseError::index_out_of_bounds(to, len));
        }
        if from == to {
            return Ok(false);
        }

        let moved = self.items.remove(from);
        self.items.insert(to, moved);

        tracing::debug!(from, to, "reordered document");
        self.publish();
        Ok(true)
    }

    /// Remove the document at `index`; later documents shift left.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFuseError::IndexOutOfBounds`] if `index` is outside the
    /// queue.
    pub fn remove(&mut self, index: usize) -> Result<QueuedDocument> {
        let len = self.items.len();
        if index >= len {
            return Err(PdfFuseError::index_out_of_bounds(index, len));
        }

        let removed = self.items.remove(index);

        tracing::debug!(index, name = removed.name(), "removed document");
        self.publish();
        Ok(removed)
    }

    /// Number of queued documents.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Document at `index`.
    pub fn get(&self, index: usize) -> Option<&QueuedDocument> {
        self.items.get(index)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshots published after each mutation.
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self) {
        self.snapshots.send_replace(QueueSnapshot::new(&self.items));
    }
}

impl Default for DocumentQueue {
    fn default() -> Self {
        Self::new()
    }
}
