//! The event surface of a merge workflow.
//!
//! A [`MergeSession`] owns one queue, one engine and one delivery target.
//! Input adapters (a CLI, a drag-and-drop front end) translate user actions
//! into the `on_*` calls below.

use serde::Serialize;
use tokio::sync::watch;

use crate::config::Config;
use crate::error::{PdfFuseError, Result};
use crate::io::{Delivery, DeliveryReceipt};
use crate::library::{DocumentLibrary, LopdfLibrary};
use crate::merge::{MergeEngine, MergeState, PageContribution};
use crate::queue::{DocumentQueue, IntakeReport, QueueEntry, QueueSnapshot, QueuedDocument};
use crate::source::SourceFile;

/// Outcome of a delivered merge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Where the merged document was delivered.
    pub delivery: DeliveryReceipt,
    /// Media type of the delivered document.
    pub media_type: String,
    /// Queue order the merge consumed.
    pub documents: Vec<QueueEntry>,
    /// Number of inputs merged.
    pub files_merged: usize,
    /// Pages in the merged document.
    pub total_pages: usize,
    /// Total size of the inputs.
    pub input_size: u64,
    /// Size of the merged document.
    pub output_size: u64,
    /// Merge time in milliseconds.
    pub merge_time_ms: u64,
    /// Pages each input contributed.
    pub contributions: Vec<PageContribution>,
}

/// Merge plan produced without writing anything.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePlan {
    /// Queue order that would be merged.
    pub documents: Vec<QueueEntry>,
    /// Pages each input would contribute.
    pub contributions: Vec<PageContribution>,
    /// Pages the merged document would have.
    pub total_pages: usize,
    /// File name the output would be delivered under.
    pub output_name: String,
}

/// One queue, one engine and one delivery target.
#[derive(Debug)]
pub struct MergeSession<D, L = LopdfLibrary> {
    config: Config,
    queue: DocumentQueue,
    engine: MergeEngine<L>,
    delivery: D,
}

impl<D: Delivery> MergeSession<D, LopdfLibrary> {
    /// Session using `lopdf` with the compression and metadata of `config`.
    pub fn new(config: Config, delivery: D) -> Self {
        let library = LopdfLibrary::from_config(&config);
        Self::with_library(config, library, delivery)
    }
}

impl<D: Delivery, L: DocumentLibrary> MergeSession<D, L> {
    /// Session over a specific document library.
    pub fn with_library(config: Config, library: L, delivery: D) -> Self {
        Self {
            config,
            queue: DocumentQueue::new(),
            engine: MergeEngine::new(library),
            delivery,
        }
    }

    /// Files were offered by the user. Non-PDF candidates are dropped.
    pub fn on_files_added<I>(&mut self, files: I) -> IntakeReport
    where
        I: IntoIterator<Item = SourceFile>,
    {
        self.queue.append(files)
    }

    /// A document was dragged from `from` to `to`; `None` means it was
    /// dropped outside the list.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFuseError::IndexOutOfBounds`] for positions outside the
    /// queue.
    pub fn on_reorder(&mut self, from: usize, to: Option<usize>) -> Result<bool> {
        self.queue.reorder(from, to)
    }

    /// The document at `index` was removed.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFuseError::IndexOutOfBounds`] if `index` is outside the
    /// queue.
    pub fn on_remove(&mut self, index: usize) -> Result<QueuedDocument> {
        self.queue.remove(index)
    }

    /// Whether a merge request would be acted on right now.
    pub fn can_merge(&self) -> bool {
        self.queue.len() >= self.config.min_documents && !self.engine.is_processing()
    }

    /// The user asked for a merge.
    ///
    /// Returns `Ok(None)` when the request is ignored: too few documents are
    /// queued, or a merge is already running. Otherwise the current queue
    /// order is merged and delivered under [`Config::output_name`]. The
    /// queue is left as it was, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Propagates read, decode, serialization and delivery failures.
    pub async fn on_merge_requested(&self) -> Result<Option<MergeReport>> {
        if self.queue.len() < self.config.min_documents {
            tracing::debug!(
                queued = self.queue.len(),
                required = self.config.min_documents,
                "merge request ignored: not enough documents"
            );
            return Ok(None);
        }

        let snapshot = self.queue.snapshot();
        let merged = match self.engine.merge(snapshot.documents()).await {
            Ok(merged) => merged,
            Err(PdfFuseError::ReentrancyRejected) => {
                tracing::debug!("merge request ignored: merge already running");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let delivery = self
            .delivery
            .deliver(&merged.bytes, merged.media_type, &self.config.output_name())
            .await?;

        let statistics = merged.statistics;
        Ok(Some(MergeReport {
            delivery,
            media_type: merged.media_type.to_string(),
            documents: snapshot.entries(),
            files_merged: statistics.files_merged,
            total_pages: statistics.total_pages,
            input_size: statistics.input_size,
            output_size: statistics.output_size,
            merge_time_ms: statistics.merge_time.as_millis() as u64,
            contributions: statistics.contributions,
        }))
    }

    /// Describe what a merge would produce without producing it.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFuseError::NotEnoughDocuments`] when the merge gate is
    /// closed, or the first read/decode failure.
    pub async fn plan(&self) -> Result<MergePlan> {
        if self.queue.len() < self.config.min_documents {
            return Err(PdfFuseError::NotEnoughDocuments {
                required: self.config.min_documents,
                queued: self.queue.len(),
            });
        }

        let snapshot = self.queue.snapshot();
        let contributions = self.engine.plan(snapshot.documents()).await?;

        Ok(MergePlan {
            documents: snapshot.entries(),
            total_pages: contributions.iter().map(|c| c.page_count).sum(),
            contributions,
            output_name: self.config.output_name(),
        })
    }

    /// Current queue order.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.queue.snapshot()
    }

    /// Subscribe to queue snapshots.
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.queue.subscribe()
    }

    /// The queue.
    pub fn queue(&self) -> &DocumentQueue {
        &self.queue
    }

    /// Engine state.
    pub fn merge_state(&self) -> MergeState {
        self.engine.state()
    }

    /// Session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The delivery target.
    pub fn delivery(&self) -> &D {
        &self.delivery
    }
}
