use crate::filename;
use crate::search::Searchable;
use chrono::NaiveDate;
use providers::{DownloadStatus, FileDetails};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaggingStatus {
    Untagged,
    Tagged,
}

/// One file of the archive with the metadata derived from its name and,
/// for untagged files, its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentRecord")]
pub struct Document {
    pub date: Option<NaiveDate>,
    #[serde(rename = "specification")]
    description: String,
    pub tags: BTreeSet<String>,
    size: u64,
    download_status: DownloadStatus,
    tagging_status: TaggingStatus,
    path: PathBuf,
    filename: String,
}

/// Cache representation. `taggingStatus` is accepted but always recomputed
/// from the filename.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    date: Option<NaiveDate>,
    specification: String,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    size: u64,
    download_status: DownloadStatus,
    #[allow(dead_code)]
    #[serde(default)]
    tagging_status: Option<TaggingStatus>,
    path: PathBuf,
    filename: String,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        let tagging_status = filename::tagging_status(&record.filename);
        Document {
            date: record.date,
            description: record.specification,
            tags: record.tags,
            size: record.size,
            download_status: record.download_status,
            tagging_status,
            path: record.path,
            filename: record.filename,
        }
    }
}

impl Document {
    pub fn from_details(details: &FileDetails) -> Self {
        let parsed = filename::parse(&details.filename);
        Document {
            date: parsed.date,
            description: parsed.description.unwrap_or_default(),
            tags: parsed.tags.unwrap_or_default().into_iter().collect(),
            size: details.size,
            download_status: details.download_status,
            tagging_status: filename::tagging_status(&details.filename),
            path: details.path.clone(),
            filename: details.filename.clone(),
        }
        .cleaned()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn download_status(&self) -> DownloadStatus {
        self.download_status
    }

    pub fn tagging_status(&self) -> TaggingStatus {
        self.tagging_status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Descriptions are stored lowercase with `-` between words.
    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_lowercase().replace('_', "-");
    }

    /// Take over the user-facing metadata of an earlier record of this file.
    pub(crate) fn restore_metadata(&mut self, from: &Document) {
        self.date = from.date;
        self.description = from.description.clone();
        self.tags = from.tags.clone();
    }

    pub(crate) fn set_download_status(&mut self, status: DownloadStatus) {
        self.download_status = status;
    }

    /// Point the document at a new file; the tagging status follows the name.
    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.tagging_status = filename::tagging_status(&self.filename);
        self.path = path;
    }

    /// Name of the directory holding the file, e.g. the year in the archive.
    pub fn folder(&self) -> String {
        self.path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// "blue-pullover" -> "Blue Pullover"
    pub fn description_capitalized(&self) -> String {
        self.description
            .split(|c| c == '-' || c == ' ')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Drop placeholder values left behind by [`filename::create_filename`]
    /// and blank tags.
    pub fn cleaned(mut self) -> Self {
        if self.description.contains(filename::DESCRIPTION_PLACEHOLDER) {
            self.description.clear();
        }
        self.tags
            .retain(|t| !t.trim().is_empty() && t != filename::TAG_PLACEHOLDER);
        self
    }
}

impl Searchable for Document {
    fn search_term(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.filename)
    }
}

/// Archive order: date ascending (undated first), then filename descending.
/// The path breaks remaining ties so the order is total.
pub fn archive_order(a: &Document, b: &Document) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| b.filename.cmp(&a.filename))
        .then_with(|| a.path.cmp(&b.path))
}

/// Metadata changes requested by a user. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentEdit {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub tags: Option<BTreeSet<String>>,
}

impl DocumentEdit {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.description.is_none() && self.tags.is_none()
    }

    pub fn apply(&self, document: &mut Document) {
        if let Some(date) = self.date {
            document.date = Some(date);
        }
        if let Some(description) = &self.description {
            document.set_description(description);
        }
        if let Some(tags) = &self.tags {
            document.tags = tags.iter().map(|t| t.to_lowercase()).collect();
        }
    }
}
