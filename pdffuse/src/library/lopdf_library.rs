//! `lopdf` implementation of the document-library capability.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::collections::HashMap;

use crate::config::{CompressionLevel, Config, Metadata};
use crate::error::{PdfFuseError, Result};
use crate::library::DocumentLibrary;
use crate::merge::metadata::MetadataManager;

/// PDF version written for merged documents.
const OUTPUT_PDF_VERSION: &str = "1.7";

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page-tree depth after which a `Parent` chain is treated as cyclic.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Document library backed by `lopdf`.
///
/// Serialization stamps the output with metadata and applies the configured
/// compression level.
///
/// # Examples
///
/// ```
/// use pdffuse::library::{DocumentLibrary, LopdfLibrary};
///
/// let library = LopdfLibrary::new();
/// let mut doc = library.create_empty_document();
/// assert!(library.page_indices(&doc).is_empty());
///
/// let bytes = library.serialize(&mut doc).unwrap();
/// assert!(bytes.starts_with(b"%PDF-"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LopdfLibrary {
    compression: CompressionLevel,
    metadata: Metadata,
    metadata_manager: MetadataManager,
}

impl LopdfLibrary {
    /// Library with default compression and no user metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library using the compression and metadata of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            compression: config.compression,
            metadata: config.metadata.clone(),
            metadata_manager: MetadataManager::new(),
        }
    }

    /// Compression level applied at serialization.
    pub fn compression(&self) -> CompressionLevel {
        self.compression
    }

    fn pages_root(document: &Document) -> Result<ObjectId> {
        document
            .catalog()
            .map_err(|e| PdfFuseError::merge_failed(format!("Failed to get catalog: {e}")))?
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|e| PdfFuseError::merge_failed(format!("Failed to get pages reference: {e}")))
    }
}

impl DocumentLibrary for LopdfLibrary {
    type Document = Document;
    type PageRef = ObjectId;
    type Page = ObjectId;

    fn create_empty_document(&self) -> Document {
        let mut document = Document::with_version(OUTPUT_PDF_VERSION);

        let pages_id = document.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        document
    }

    fn load_document(&self, name: &str, bytes: &[u8]) -> Result<Document> {
        let document = Document::load_mem(bytes).map_err(|e| {
            let reason = e.to_string();
            let lowered = reason.to_lowercase();
            if lowered.contains("encrypt") || lowered.contains("password") {
                PdfFuseError::encrypted_pdf(name)
            } else {
                PdfFuseError::decode_failed(name, reason)
            }
        })?;

        Self::pages_root(&document)
            .map_err(|e| PdfFuseError::decode_failed(name, e.to_string()))?;

        tracing::debug!(
            name,
            version = %document.version,
            pages = document.get_pages().len(),
            "decoded document"
        );
        Ok(document)
    }

    fn page_indices(&self, document: &Document) -> Vec<ObjectId> {
        document.get_pages().into_values().collect()
    }

    fn copy_pages(
        &self,
        target: &mut Document,
        source: &Document,
        pages: &[ObjectId],
    ) -> Result<Vec<ObjectId>> {
        let mut copier = ObjectCopier::new(source, target);
        pages.iter().map(|&page_id| copier.copy_page(page_id)).collect()
    }

    fn add_page(&self, target: &mut Document, page: ObjectId) -> Result<()> {
        let pages_id = Self::pages_root(target)?;

        target
            .get_dictionary_mut(page)
            .map_err(|e| PdfFuseError::merge_failed(format!("Copied page is missing: {e}")))?
            .set("Parent", pages_id);

        let pages = target
            .get_dictionary_mut(pages_id)
            .map_err(|e| PdfFuseError::merge_failed(format!("Failed to get pages object: {e}")))?;

        match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page)),
            Ok(_) => return Err(PdfFuseError::merge_failed("Kids is not an array")),
            Err(_) => return Err(PdfFuseError::merge_failed("Pages dictionary missing Kids array")),
        }

        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages.set("Count", Object::Integer(count + 1));

        Ok(())
    }

    fn serialize(&self, document: &mut Document) -> Result<Vec<u8>> {
        self.metadata_manager.stamp(document, &self.metadata)?;

        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => document.compress(),
            CompressionLevel::Maximum => {
                document.prune_objects();
                document.renumber_objects();
                document.compress();
            }
        }

        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|e| PdfFuseError::SerializeFailed {
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }
}

/// Deep-copies objects from one document into another.
///
/// Each source object is copied at most once per copier, so resources shared
/// by several pages stay shared in the target.
struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            copied: HashMap::new(),
        }
    }

    /// Copy one page as a standalone page object with no `Parent`.
    ///
    /// A page already reached through a reference (a link destination on an
    /// earlier page) is not copied again.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId> {
        if let Some(&copied) = self.copied.get(&page_id) {
            return Ok(copied);
        }

        let source = self.source;
        let page = source.get_dictionary(page_id).map_err(|e| {
            PdfFuseError::merge_failed(format!(
                "Failed to read page {} {}: {e}",
                page_id.0, page_id.1
            ))
        })?;

        Ok(self.copy_page_dictionary(page_id, page))
    }

    fn copy_page_dictionary(&mut self, page_id: ObjectId, page: &Dictionary) -> ObjectId {
        let mut page = page.clone();
        for key in INHERITABLE_ATTRIBUTES {
            if !page.has(key)
                && let Some(value) = self.inherited_attribute(&page, key)
            {
                page.set(key, value);
            }
        }
        page.remove(b"Parent");

        // Registered before the walk so back-references from annotations
        // resolve to this copy.
        let new_id = self.target.new_object_id();
        self.copied.insert(page_id, new_id);

        let copied = self.copy_dictionary(&page);
        self.target.objects.insert(new_id, Object::Dictionary(copied));
        new_id
    }

    fn inherited_attribute(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

        for _ in 0..MAX_PAGE_TREE_DEPTH {
            let node = self.source.get_dictionary(parent?).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        None
    }

    fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.copy_reference(*id)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_object(item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(copied)
            }
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            // Page-tree links would drag the whole source tree along.
            if key.as_slice() == b"Parent" && is_page_node(value, self.source) {
                continue;
            }
            let value = self.copy_object(value);
            copied.set(key.clone(), value);
        }
        copied
    }

    fn copy_reference(&mut self, id: ObjectId) -> ObjectId {
        if let Some(&copied) = self.copied.get(&id) {
            return copied;
        }

        let source = self.source;
        let object = match source.get_object(id) {
            Ok(Object::Dictionary(dict)) if is_page_dictionary(dict) => {
                return self.copy_page_dictionary(id, dict);
            }
            Ok(object) => Some(object),
            Err(_) => None,
        };

        let new_id = self.target.new_object_id();
        self.copied.insert(id, new_id);

        let copied = object.map_or(Object::Null, |object| self.copy_object(object));
        self.target.objects.insert(new_id, copied);
        new_id
    }
}

fn is_page_node(value: &Object, source: &Document) -> bool {
    let Ok(id) = value.as_reference() else {
        return false;
    };
    source
        .get_dictionary(id)
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|kind| kind.as_name().ok())
        .is_some_and(|kind| kind == b"Pages" || kind == b"Page")
}

fn is_page_dictionary(dict: &Dictionary) -> bool {
    dict.get(b"Type")
        .and_then(Object::as_name)
        .is_ok_and(|kind| kind == b"Page")
}
