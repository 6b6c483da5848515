//! Output document metadata.
//!
//! Every merged document gets an Info dictionary with:
//! - Producer and Creator set to this crate
//! - CreationDate and ModDate set to the time of serialization
//! - Title, Author, Subject, Keywords when configured

use crate::config::Metadata;
use crate::error::{PdfFuseError, Result};
use lopdf::{Dictionary, Document, Object, StringFormat};
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes and reads the Info dictionary of a document.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Stamp a document with producer information and the given metadata.
    ///
    /// Existing Info entries not covered by `metadata` are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`PdfFuseError::MetadataFailed`] if the trailer points at an
    /// Info object that is not a dictionary.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pdffuse::merge::metadata::MetadataManager;
    /// # use pdffuse::config::Metadata;
    /// # use lopdf::Document;
    /// let mut doc = Document::with_version("1.7");
    /// let metadata = Metadata::new(Some("Quarterly".to_string()), None, None, None);
    ///
    /// MetadataManager::new().stamp(&mut doc, &metadata).unwrap();
    /// assert!(MetadataManager::new().has_metadata(&doc));
    /// ```
    pub fn stamp(&self, doc: &mut Document, metadata: &Metadata) -> Result<()> {
        let info = Self::info_dictionary_mut(doc)?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text(value));
            }
        }

        info.set("Creator", text(crate::NAME));
        info.set("Producer", text(&format!("{} {}", crate::NAME, crate::VERSION)));

        let now = format_pdf_date(SystemTime::now());
        info.set("CreationDate", text(&now));
        info.set("ModDate", text(&now));

        Ok(())
    }

    /// Read the user-facing fields of the Info dictionary.
    pub fn read(&self, doc: &Document) -> Metadata {
        let Some(info) = Self::info_dictionary(doc) else {
            return Metadata::default();
        };

        Metadata::new(
            string_field(info, b"Title"),
            string_field(info, b"Author"),
            string_field(info, b"Subject"),
            string_field(info, b"Keywords"),
        )
    }

    /// Whether the trailer references an Info dictionary.
    pub fn has_metadata(&self, doc: &Document) -> bool {
        Self::info_dictionary(doc).is_some()
    }

    /// Producer string of a document, if any.
    pub fn producer(&self, doc: &Document) -> Option<String> {
        Self::info_dictionary(doc).and_then(|info| string_field(info, b"Producer"))
    }

    fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
        let id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
        doc.get_dictionary(id).ok()
    }

    fn info_dictionary_mut(doc: &mut Document) -> Result<&mut Dictionary> {
        let id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(id) => id,
            Err(_) => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", Object::Reference(id));
                id
            }
        };

        doc.get_dictionary_mut(id)
            .map_err(|err| PdfFuseError::MetadataFailed {
                reason: format!("Info object {} {} is not a dictionary: {err}", id.0, id.1),
            })
    }
}

/// Byte-order mark that marks a text string as UTF-16BE.
const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Encode a PDF text string. ASCII stays a literal; anything else is
/// written as UTF-16BE behind a byte-order mark.
fn text(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let bytes = UTF16_BOM
        .into_iter()
        .chain(value.encode_utf16().flat_map(u16::to_be_bytes))
        .collect();
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text(bytes: &[u8]) -> Option<String> {
    match bytes.strip_prefix(&UTF16_BOM) {
        Some(encoded) => {
            let units: Vec<u16> = encoded
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        None => String::from_utf8(bytes.to_vec()).ok(),
    }
}

fn string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_text(bytes),
        _ => None,
    }
}

/// Format a time as a UTC PDF date string (`D:YYYYMMDDHHmmSSZ`).
pub(crate) fn format_pdf_date(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);

    let days = (secs / 86_400) as i64;
    let seconds_of_day = secs % 86_400;
    let (year, month, day) = civil_from_days(days);

    format!(
        "D:{year:04}{month:02}{day:02}{:02}{:02}{:02}Z",
        seconds_of_day / 3_600,
        (seconds_of_day % 3_600) / 60,
        seconds_of_day % 60
    )
}

/// Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
