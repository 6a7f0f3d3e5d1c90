use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether the bytes of a file are materialized on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadStatus {
    Local,
    /// Only a cloud placeholder exists locally.
    Remote,
    /// Download in progress, percent in `0.0..=100.0`.
    Downloading(f32),
}

impl DownloadStatus {
    pub fn is_local(&self) -> bool {
        matches!(self, DownloadStatus::Local)
    }
}

/// What a provider knows about one file of its root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDetails {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
    pub download_status: DownloadStatus,
}

impl FileDetails {
    /// True when any attribute the index cares about differs.
    pub fn differs_from(&self, other: &FileDetails) -> bool {
        self.size != other.size
            || self.download_status != other.download_status
            || self.filename != other.filename
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileChangeEvent {
    Added(FileDetails),
    Updated(FileDetails),
    Removed(PathBuf),
}

impl FileChangeEvent {
    pub fn path(&self) -> &std::path::Path {
        match self {
            FileChangeEvent::Added(d) | FileChangeEvent::Updated(d) => &d.path,
            FileChangeEvent::Removed(p) => p,
        }
    }
}

/// Files of one root as last seen, ordered by path.
pub type FolderSnapshot = Vec<FileDetails>;
