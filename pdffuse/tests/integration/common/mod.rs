//! Shared helpers for integration tests.
//!
//! Test PDFs are generated on the fly. Every page carries a `Marker` string
//! (`A1`, `A2`, ...) so the page order of a merged file can be asserted.

use lopdf::{Document, Object, dictionary};
use pdffuse::source::SourceFile;
use std::path::{Path, PathBuf};

/// Build a PDF with `pages` pages marked `{label}1`, `{label}2`, ...
pub fn marked_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|number| {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
                "Marker" => Object::string_literal(format!("{label}{number}")),
            });
            page_id.into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize test PDF");
    bytes
}

/// Write a marked PDF into `dir` and return its path.
pub fn write_marked_pdf(dir: &Path, name: &str, label: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, marked_pdf(label, pages)).expect("Failed to write test PDF");
    path
}

/// Open a handle to a file written by the helpers above.
pub async fn source(path: &Path) -> SourceFile {
    SourceFile::from_path(path)
        .await
        .expect("Failed to open test PDF")
}

/// Page markers of a PDF file, in page order.
pub fn markers_in_file(path: &Path) -> Vec<String> {
    let bytes = std::fs::read(path).expect("Failed to read merged PDF");
    markers(&bytes)
}

/// Page markers of a serialized PDF, in page order.
pub fn markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("Merged output is not a valid PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).expect("Page is not a dictionary");
            match page.get(b"Marker") {
                Ok(Object::String(marker, _)) => String::from_utf8_lossy(marker).into_owned(),
                other => panic!("Page {id:?} has no marker: {other:?}"),
            }
        })
        .collect()
}
