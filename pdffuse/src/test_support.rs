//! In-memory PDF fixtures for unit tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::queue::QueuedDocument;
use crate::source::{PDF_MEDIA_TYPE, SourceFile};

/// Build a PDF with `pages` pages marked `{label}1`, `{label}2`, ...
///
/// Resources and MediaBox live on the page-tree root so copies must resolve
/// them through inheritance.
pub(crate) fn marked_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for number in 1..=pages {
        let marker = format!("{label}{number}");
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(marker.clone())]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Marker" => Object::string_literal(marker),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => pages as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Page markers of a serialized PDF, in page order.
pub(crate) fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| match doc.get_dictionary(id).unwrap().get(b"Marker").unwrap() {
            Object::String(marker, _) => String::from_utf8(marker.clone()).unwrap(),
            other => panic!("unexpected marker {other:?}"),
        })
        .collect()
}

/// A PDF source file held in memory.
pub(crate) fn pdf_source(name: &str, label: &str, pages: usize) -> SourceFile {
    SourceFile::from_bytes(name, Some(PDF_MEDIA_TYPE), marked_pdf(label, pages))
}

/// Queue-ordered documents built from `(label, pages)` pairs.
pub(crate) fn queued(specs: &[(&str, usize)]) -> Vec<QueuedDocument> {
    specs
        .iter()
        .enumerate()
        .map(|(ordinal, (label, pages))| {
            QueuedDocument::new(
                pdf_source(&format!("{label}.pdf"), label, *pages),
                ordinal as u64,
            )
        })
        .collect()
}
