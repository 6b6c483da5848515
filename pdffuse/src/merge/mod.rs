//! PDF merging.
//!
//! This module contains the merge engine and the metadata stamped onto its
//! output:
//! - [`MergeEngine`]: sequential, all-or-nothing page concatenation
//! - [`MetadataManager`]: Info dictionary handling

pub mod engine;
pub mod metadata;

pub use engine::{MergeEngine, MergeState, MergeStatistics, MergedDocument, PageContribution};
pub use metadata::MetadataManager;
