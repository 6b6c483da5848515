//! Sequential page-concatenation engine.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{PdfFuseError, Result};
use crate::library::{DocumentLibrary, LopdfLibrary};
use crate::queue::QueuedDocument;
use crate::source::PDF_MEDIA_TYPE;

/// Lifecycle of the engine.
///
/// `Idle → Processing → {Succeeded, Failed}`. A new merge may start from
/// any state other than `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeState {
    /// No merge has run, or the last one was abandoned.
    #[default]
    Idle,
    /// A merge is running.
    Processing,
    /// The last merge produced output.
    Succeeded,
    /// The last merge failed.
    Failed,
}

/// Pages one input contributed to the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContribution {
    /// Input file name.
    pub name: String,
    /// First output page taken from this input (1-based).
    pub first_page: usize,
    /// Number of pages taken from this input.
    pub page_count: usize,
}

impl PageContribution {
    /// Last output page taken from this input (1-based), if it has pages.
    pub fn last_page(&self) -> Option<usize> {
        (self.page_count > 0).then(|| self.first_page + self.page_count - 1)
    }
}

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStatistics {
    /// Number of inputs merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total size of input files.
    pub input_size: u64,

    /// Size of the serialized output.
    pub output_size: u64,

    /// Total time taken for the merge.
    pub merge_time: Duration,

    /// Per-input page ranges, in output order.
    pub contributions: Vec<PageContribution>,
}

/// The single output of a successful merge.
#[derive(Debug, Clone)]
pub struct MergedDocument {
    /// Serialized PDF.
    pub bytes: Vec<u8>,

    /// Always `application/pdf`.
    pub media_type: &'static str,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// Concatenates queued documents page by page.
///
/// The engine holds no queue of its own: it reads the documents it is given
/// in order and never mutates them.
///
/// # Examples
///
/// ```no_run
/// # use pdffuse::merge::MergeEngine;
/// # use pdffuse::queue::QueuedDocument;
/// # async fn example(documents: Vec<QueuedDocument>) -> pdffuse::Result<()> {
/// let engine = MergeEngine::default();
/// let merged = engine.merge(&documents).await?;
/// println!(
///     "Merged {} files into {} pages",
///     merged.statistics.files_merged, merged.statistics.total_pages
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MergeEngine<L = LopdfLibrary> {
    library: L,
    state: Mutex<MergeState>,
}

impl<L: DocumentLibrary> MergeEngine<L> {
    /// Create an engine over a document library.
    pub fn new(library: L) -> Self {
        Self {
            library,
            state: Mutex::new(MergeState::Idle),
        }
    }

    /// The document library in use.
    pub fn library(&self) -> &L {
        &self.library
    }

    /// Current state.
    pub fn state(&self) -> MergeState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a merge is running.
    pub fn is_processing(&self) -> bool {
        self.state() == MergeState::Processing
    }

    /// Merge `documents` in order into one PDF.
    ///
    /// Each input is read, decoded and fully appended before the next one
    /// is touched. The first failure aborts the whole merge.
    ///
    /// # Errors
    ///
    /// - [`PdfFuseError::ReentrancyRejected`] if a merge is already running;
    ///   the running merge is unaffected
    /// - [`PdfFuseError::NoFilesToMerge`] if `documents` is empty
    /// - [`PdfFuseError::FailedToReadSource`], [`PdfFuseError::DecodeFailed`]
    ///   or [`PdfFuseError::EncryptedPdf`] if an input cannot be used
    pub async fn merge(&self, documents: &[QueuedDocument]) -> Result<MergedDocument> {
        let guard = ProcessingGuard::acquire(&self.state)?;

        tracing::info!(documents = documents.len(), "merge started");
        let result = self.run(documents).await;

        match &result {
            Ok(merged) => {
                tracing::info!(
                    files = merged.statistics.files_merged,
                    pages = merged.statistics.total_pages,
                    bytes = merged.bytes.len(),
                    elapsed_ms = merged.statistics.merge_time.as_millis() as u64,
                    "merge finished"
                );
                guard.finish(MergeState::Succeeded);
            }
            Err(err) => {
                tracing::warn!(error = %err, "merge failed");
                guard.finish(MergeState::Failed);
            }
        }

        result
    }

    /// Decode every input and report the pages each would contribute.
    ///
    /// Nothing is copied or serialized and the engine state is untouched.
    ///
    /// # Errors
    ///
    /// Fails on the first input that cannot be read or decoded.
    pub async fn plan(&self, documents: &[QueuedDocument]) -> Result<Vec<PageContribution>> {
        let mut contributions = Vec::with_capacity(documents.len());
        let mut next_page = 1;

        for queued in documents {
            let bytes = queued.file().read_bytes().await?;
            let source = self.library.load_document(queued.name(), &bytes)?;
            let page_count = self.library.page_indices(&source).len();

            contributions.push(PageContribution {
                name: queued.name().to_string(),
                first_page: next_page,
                page_count,
            });
            next_page += page_count;

            tokio::task::yield_now().await;
        }

        Ok(contributions)
    }

    async fn run(&self, documents: &[QueuedDocument]) -> Result<MergedDocument> {
        if documents.is_empty() {
            return Err(PdfFuseError::NoFilesToMerge);
        }

        let started = Instant::now();
        let mut output = self.library.create_empty_document();
        let mut statistics = MergeStatistics::default();

        for (index, queued) in documents.iter().enumerate() {
            tracing::debug!(position = index + 1, name = queued.name(), "appending document");

            let bytes = queued.file().read_bytes().await?;
            let source = self.library.load_document(queued.name(), &bytes)?;
            let indices = self.library.page_indices(&source);

            let pages = self.library.copy_pages(&mut output, &source, &indices)?;
            for page in pages {
                self.library.add_page(&mut output, page)?;
            }

            statistics.contributions.push(PageContribution {
                name: queued.name().to_string(),
                first_page: statistics.total_pages + 1,
                page_count: indices.len(),
            });
            statistics.total_pages += indices.len();
            statistics.input_size += bytes.len() as u64;
            statistics.files_merged += 1;

            tokio::task::yield_now().await;
        }

        let bytes = self.library.serialize(&mut output)?;
        statistics.output_size = bytes.len() as u64;
        statistics.merge_time = started.elapsed();

        Ok(MergedDocument {
            bytes,
            media_type: PDF_MEDIA_TYPE,
            statistics,
        })
    }
}

impl Default for MergeEngine<LopdfLibrary> {
    fn default() -> Self {
        Self::new(LopdfLibrary::new())
    }
}

/// Holds the engine in `Processing`; falls back to `Idle` if dropped
/// without [`finish`](Self::finish).
struct ProcessingGuard<'a> {
    state: &'a Mutex<MergeState>,
    finished: bool,
}

impl<'a> ProcessingGuard<'a> {
    fn acquire(state: &'a Mutex<MergeState>) -> Result<Self> {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == MergeState::Processing {
            tracing::debug!("merge already running, rejecting request");
            return Err(PdfFuseError::ReentrancyRejected);
        }
        *current = MergeState::Processing;

        Ok(Self {
            state,
            finished: false,
        })
    }

    fn finish(mut self, outcome: MergeState) {
        self.set(outcome);
        self.finished = true;
    }

    fn set(&self, value: MergeState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.set(MergeState::Idle);
        }
    }
}
