//! pdffuse - Queue, reorder and fuse PDF documents into a single file.
//!
//! This library models a merge workflow as an ordered queue of documents
//! and an engine that concatenates them page by page. It provides:
//!
//! - Intake that keeps only PDF files and ignores everything else
//! - Reorder and remove operations with stable row keys
//! - Sequential, all-or-nothing merging with a re-entrancy guard
//! - Atomic delivery of the merged document
//! - Comprehensive error handling
//!
//! # Examples
//!
//! ## Session
//!
//! ```no_run
//! use pdffuse::config::Config;
//! use pdffuse::io::FileDelivery;
//! use pdffuse::session::MergeSession;
//! use pdffuse::source::SourceFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let delivery = FileDelivery::from_config(&config);
//! let mut session = MergeSession::new(config, delivery);
//!
//! session.on_files_added([
//!     SourceFile::from_path("a.pdf").await?,
//!     SourceFile::from_path("b.pdf").await?,
//! ]);
//! session.on_reorder(1, Some(0))?;
//!
//! if let Some(report) = session.on_merge_requested().await? {
//!     println!("Wrote {} pages to {}", report.total_pages, report.delivery.location);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the Engine Directly
//!
//! ```no_run
//! use pdffuse::merge::MergeEngine;
//! use pdffuse::queue::DocumentQueue;
//! use pdffuse::source::SourceFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut queue = DocumentQueue::new();
//! queue.append([SourceFile::from_path("only.pdf").await?]);
//!
//! let merged = MergeEngine::default().merge(queue.snapshot().documents()).await?;
//! std::fs::write("copy.pdf", &merged.bytes)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod library;
pub mod merge;
pub mod output;
pub mod queue;
pub mod session;
pub mod source;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{PdfFuseError, Result};
pub use merge::{MergeEngine, MergeState, MergedDocument};
pub use queue::{DocumentQueue, QueueSnapshot, QueuedDocument};
pub use session::{MergeReport, MergeSession};
pub use source::SourceFile;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
