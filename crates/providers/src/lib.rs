//! Folder providers: one per watched root, turning directory listings into
//! change events and exposing the file primitives of the storage backend.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub mod diff;
mod folder;
pub mod local;
pub mod synced;
pub mod types;

pub use types::{DownloadStatus, FileChangeEvent, FileDetails, FolderSnapshot};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no provider can serve {0}")]
    Unavailable(PathBuf),
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("{0} is not downloaded")]
    NotDownloaded(PathBuf),
    #[error("command failed: {0}")]
    Command(String),
    #[error("trash failed: {0}")]
    Trash(String),
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error("watch failed: {0}")]
    Watch(#[from] notify::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives the change events of a root, tagged with that root.
pub type ChangeHandler = Arc<dyn Fn(&Path, Vec<FileChangeEvent>) + Send + Sync>;

/// Storage primitives and change tracking for one watched root.
pub trait FolderProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;
    fn root(&self) -> &Path;

    /// Rescan the root and forward the differences to the change handler.
    fn refresh(&self) -> Vec<FileChangeEvent>;
    /// Rescan automatically on filesystem notifications until dropped.
    fn watch(&self) -> Result<(), ProviderError>;

    fn save(&self, data: &[u8], at: &Path) -> Result<(), ProviderError>;
    fn start_download(&self, of: &Path) -> Result<(), ProviderError>;
    fn fetch(&self, path: &Path) -> Result<Vec<u8>, ProviderError>;
    fn delete(&self, path: &Path) -> Result<(), ProviderError>;
    fn rename(&self, from: &Path, to: &Path) -> Result<(), ProviderError>;

    fn create_folder(&self, path: &Path) -> Result<(), ProviderError> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Attach OS-level tags to a file. Backends without tag support ignore it.
    fn save_tags(&self, _path: &Path, _tags: &[String]) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Folder provider implementations, in selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Synced,
    Local,
}

impl ProviderKind {
    pub const PRECEDENCE: [ProviderKind; 2] = [ProviderKind::Synced, ProviderKind::Local];

    fn accepts(&self, root: &Path) -> bool {
        match self {
            ProviderKind::Synced => root.components().any(|c| match c {
                Component::Normal(name) => name
                    .to_str()
                    .map(|n| SYNCED_MARKERS.contains(&n))
                    .unwrap_or(false),
                _ => false,
            }),
            ProviderKind::Local => root.is_absolute(),
        }
    }
}

const SYNCED_MARKERS: [&str; 3] = ["Mobile Documents", "iCloud Drive", "com~apple~CloudDocs"];

/// Pick the provider kind for a root; the first kind in
/// [`ProviderKind::PRECEDENCE`] that accepts the path wins.
pub fn classify(root: &Path) -> Option<ProviderKind> {
    ProviderKind::PRECEDENCE
        .into_iter()
        .find(|kind| kind.accepts(root))
}

#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    /// Glob patterns of paths to ignore.
    pub exclude: Vec<String>,
    /// Move deleted files to the OS trash instead of unlinking them.
    pub use_trash: bool,
    /// Program and leading arguments run with a path to materialize a remote file.
    pub download_command: Vec<String>,
}

/// Classify `root` and construct the matching provider.
pub fn build_provider(
    root: &Path,
    handler: ChangeHandler,
    options: &ProviderOptions,
) -> Result<Box<dyn FolderProvider>, ProviderError> {
    let kind = classify(root).ok_or_else(|| ProviderError::Unavailable(root.to_path_buf()))?;
    if !root.is_dir() {
        return Err(ProviderError::Unavailable(root.to_path_buf()));
    }
    let provider: Box<dyn FolderProvider> = match kind {
        ProviderKind::Synced => Box::new(synced::SyncedFolderProvider::new(
            root.to_path_buf(),
            handler,
            options,
        )?),
        ProviderKind::Local => Box::new(local::LocalFolderProvider::new(
            root.to_path_buf(),
            handler,
            options,
        )?),
    };
    Ok(provider)
}
