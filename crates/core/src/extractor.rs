//! Content metadata: reading the text of a document and merging the date and
//! tags found in it into the document.

use crate::dates::DateParser;
use crate::filename;
use crate::models::Document;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const MAX_TEXT_BYTES: u64 = 256 * 1024;

/// Which kinds of metadata content parsing may fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsingOptions {
    pub dates: bool,
    pub tags: bool,
}

impl ParsingOptions {
    pub const ALL: ParsingOptions = ParsingOptions {
        dates: true,
        tags: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.dates && !self.tags
    }
}

impl Default for ParsingOptions {
    fn default() -> Self {
        Self::ALL
    }
}

/// Yields the plain text of a document, if any can be obtained.
pub trait TextSource: Send + Sync {
    fn text(&self, path: &Path) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSourceKind {
    /// Sidecar first, then the pdf text layer.
    #[default]
    Auto,
    Sidecar,
    Pdf,
    None,
}

pub fn text_source(kind: TextSourceKind) -> Arc<dyn TextSource> {
    match kind {
        TextSourceKind::Auto => Arc::new(FirstOf(vec![
            Box::new(SidecarText),
            Box::new(PdfText),
        ])),
        TextSourceKind::Sidecar => Arc::new(SidecarText),
        TextSourceKind::Pdf => Arc::new(PdfText),
        TextSourceKind::None => Arc::new(NoText),
    }
}

pub struct NoText;

impl TextSource for NoText {
    fn text(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// Text written by an external OCR step to a hidden `.<filename>.txt` next
/// to the document. Hidden files never show up as documents themselves.
pub struct SidecarText;

impl SidecarText {
    pub fn sidecar_path(path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_string_lossy();
        Some(path.with_file_name(format!(".{name}.txt")))
    }
}

impl TextSource for SidecarText {
    fn text(&self, path: &Path) -> Option<String> {
        let sidecar = Self::sidecar_path(path)?;
        let file = fs::File::open(&sidecar).ok()?;
        let mut buf = Vec::new();
        if let Err(e) = file.take(MAX_TEXT_BYTES).read_to_end(&mut buf) {
            debug!(path = %sidecar.display(), error = %e, "sidecar unreadable");
            return None;
        }
        non_blank(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// The embedded text layer of a pdf. Needs the `pdf` feature.
pub struct PdfText;

impl TextSource for PdfText {
    fn text(&self, path: &Path) -> Option<String> {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return None;
        }
        pdf_text(path).and_then(non_blank)
    }
}

#[cfg(feature = "pdf")]
fn pdf_text(path: &Path) -> Option<String> {
    match pdf_extract::extract_text(path) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "pdf text extraction failed");
            None
        }
    }
}

#[cfg(not(feature = "pdf"))]
fn pdf_text(_path: &Path) -> Option<String> {
    None
}

struct FirstOf(Vec<Box<dyn TextSource>>);

impl TextSource for FirstOf {
    fn text(&self, path: &Path) -> Option<String> {
        self.0.iter().find_map(|source| source.text(path))
    }
}

fn non_blank(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}

/// Known tags that occur in `text` as whole words, ignoring case.
pub fn find_tags(text: &str, known: &BTreeSet<String>) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    let words: HashSet<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    known
        .iter()
        .filter(|tag| {
            let tag = tag.to_lowercase();
            if tag.chars().all(char::is_alphanumeric) {
                words.contains(tag.as_str())
            } else {
                !tag.is_empty() && lower.contains(&tag)
            }
        })
        .cloned()
        .collect()
}

/// Fill in metadata found in `text`. A date only replaces one that did not
/// come from a canonical filename; tags are only ever added. Returns whether
/// the document changed.
pub fn merge_content(
    document: &mut Document,
    text: &str,
    dates: &dyn DateParser,
    known_tags: &BTreeSet<String>,
    options: ParsingOptions,
) -> bool {
    if text.trim().is_empty() || options.is_empty() {
        return false;
    }
    let mut changed = false;

    if options.dates && !filename::has_filename_date(document.filename()) {
        if let Some((date, _)) = dates.parse(text) {
            if document.date != Some(date) {
                document.date = Some(date);
                changed = true;
            }
        }
    }

    if options.tags {
        for tag in find_tags(text, known_tags) {
            changed |= document.tags.insert(tag);
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::TextDateParser;
    use chrono::NaiveDate;
    use providers::{DownloadStatus, FileDetails};

    fn document(name: &str) -> Document {
        Document::from_details(&FileDetails {
            path: PathBuf::from("/in").join(name),
            filename: name.to_string(),
            size: 1,
            download_status: DownloadStatus::Local,
        })
    }

    fn known(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    const INVOICE: &str = "INVOICE\nDate: 2021-03-12\nOne bill for clothes, paid in full.";

    #[test]
    fn merges_date_and_known_tags() {
        let mut doc = document("scan1.pdf");
        let changed = merge_content(
            &mut doc,
            INVOICE,
            &TextDateParser,
            &known(&["bill", "clothes", "tax"]),
            ParsingOptions::ALL,
        );
        assert!(changed);
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2021, 3, 12));
        assert_eq!(doc.tags, known(&["bill", "clothes"]));
    }

    #[test]
    fn filename_date_wins() {
        let mut doc = document("2020-01-01--scan__PDFARCHIVERTEMPTAG.pdf");
        merge_content(&mut doc, INVOICE, &TextDateParser, &known(&[]), ParsingOptions::ALL);
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2020, 1, 1));
    }

    #[test]
    fn respects_options_and_blank_text() {
        let mut doc = document("scan1.pdf");
        let only_tags = ParsingOptions {
            dates: false,
            tags: true,
        };
        merge_content(&mut doc, INVOICE, &TextDateParser, &known(&["bill"]), only_tags);
        assert_eq!(doc.date, None);
        assert_eq!(doc.tags, known(&["bill"]));

        let mut doc = document("scan2.pdf");
        assert!(!merge_content(
            &mut doc,
            "  \n ",
            &TextDateParser,
            &known(&["bill"]),
            ParsingOptions::ALL
        ));
    }

    #[test]
    fn tags_match_whole_words_only() {
        let found = find_tags("Billing for the Taxi", &known(&["bill", "tax", "taxi"]));
        assert_eq!(found, known(&["taxi"]));
        let found = find_tags("your tax-return 2020", &known(&["tax-return"]));
        assert_eq!(found, known(&["tax-return"]));
    }

    #[test]
    fn sidecar_text_is_read() {
        let temp = tempfile::tempdir().unwrap();
        let doc = temp.path().join("scan1.pdf");
        std::fs::write(&doc, b"%PDF").unwrap();
        assert!(SidecarText.text(&doc).is_none());

        std::fs::write(SidecarText::sidecar_path(&doc).unwrap(), INVOICE).unwrap();
        assert_eq!(SidecarText.text(&doc).as_deref(), Some(INVOICE));
        assert!(NoText.text(&doc).is_none());
    }
}
