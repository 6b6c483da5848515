//! I/O operations for pdffuse.
//!
//! This module handles getting merged output to the user:
//! - Writing byte buffers to disk atomically
//! - Delivering merged documents under a user-facing file name

pub mod delivery;
pub mod writer;

pub use delivery::{DeliveredDocument, Delivery, DeliveryReceipt, FileDelivery, MemoryDelivery};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
