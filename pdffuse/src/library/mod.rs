//! The document-library capability.
//!
//! The merge engine never touches PDF internals itself. It drives a
//! [`DocumentLibrary`], which knows how to decode bytes into a document,
//! enumerate and copy pages between documents, and encode the result.
//! [`LopdfLibrary`] is the implementation backed by `lopdf`.

mod lopdf_library;

pub use lopdf_library::LopdfLibrary;

use crate::error::Result;

/// Decode, page-copy and encode operations used by the merge engine.
///
/// Page references are only valid for the document that produced them, and
/// copied pages are only valid for the target they were copied into.
pub trait DocumentLibrary {
    /// A decoded document.
    type Document;
    /// Handle to a page inside a source document.
    type PageRef: Copy + std::fmt::Debug;
    /// A page copied into a target document but not yet placed.
    type Page;

    /// Create a document with no pages.
    fn create_empty_document(&self) -> Self::Document;

    /// Decode `bytes`; `name` is used for error reporting only.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PdfFuseError::DecodeFailed`] for malformed input and
    /// [`crate::PdfFuseError::EncryptedPdf`] for encrypted input.
    fn load_document(&self, name: &str, bytes: &[u8]) -> Result<Self::Document>;

    /// Page handles in document order.
    fn page_indices(&self, document: &Self::Document) -> Vec<Self::PageRef>;

    /// Copy `pages` from `source` into `target`, in the given order.
    ///
    /// The copies are not part of the target's page sequence until passed
    /// to [`add_page`](Self::add_page).
    fn copy_pages(
        &self,
        target: &mut Self::Document,
        source: &Self::Document,
        pages: &[Self::PageRef],
    ) -> Result<Vec<Self::Page>>;

    /// Append a copied page to the end of the target's page sequence.
    fn add_page(&self, target: &mut Self::Document, page: Self::Page) -> Result<()>;

    /// Encode a document to bytes.
    fn serialize(&self, document: &mut Self::Document) -> Result<Vec<u8>>;
}
