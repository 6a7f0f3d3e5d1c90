//! Snapshot bookkeeping and change watching shared by the folder providers.

use crate::diff::diff;
use crate::types::{FileChangeEvent, FolderSnapshot};
use crate::{ChangeHandler, ProviderError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

pub(crate) type Lister = Box<dyn Fn(&Path) -> FolderSnapshot + Send + Sync>;

/// One watched root: the last snapshot, the handler that receives diffs and
/// the (optional) filesystem watcher that triggers rescans.
pub(crate) struct WatchedFolder {
    root: PathBuf,
    handler: ChangeHandler,
    lister: Lister,
    snapshot: Mutex<FolderSnapshot>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl WatchedFolder {
    pub(crate) fn new(root: PathBuf, handler: ChangeHandler, lister: Lister) -> Arc<Self> {
        Arc::new(Self {
            root,
            handler,
            lister,
            snapshot: Mutex::new(Vec::new()),
            watcher: Mutex::new(None),
        })
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Rescan the root, diff against the previous listing and forward the
    /// events. The snapshot lock is held while the handler runs so batches of
    /// one root are delivered in order.
    pub(crate) fn refresh(&self) -> Vec<FileChangeEvent> {
        let mut snapshot = match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let current = (self.lister)(&self.root);
        let events = diff(&snapshot, &current);
        *snapshot = current;

        if !events.is_empty() {
            debug!(root = %self.root.display(), count = events.len(), "folder changed");
            (self.handler)(&self.root, events.clone());
        }
        events
    }

    /// Start a recursive watcher; every relevant notification rescans the root.
    pub(crate) fn watch(self: &Arc<Self>) -> Result<(), ProviderError> {
        let weak: Weak<WatchedFolder> = Arc::downgrade(self);
        let mut watcher = notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Access(_)) {
                        return;
                    }
                    if let Some(folder) = weak.upgrade() {
                        folder.refresh();
                    }
                }
                Err(e) => error!("watch error: {e}"),
            },
        )?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        debug!(root = %self.root.display(), "watching");

        let mut slot = match self.watcher.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(watcher);
        Ok(())
    }
}

pub(crate) fn build_globset(patterns: &[String]) -> Result<GlobSet, ProviderError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

/// A file found below a root together with its size.
pub(crate) struct FoundFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// Walk `root` recursively and return every regular file that is not
/// excluded. Hidden directories are not descended into; hidden files are
/// returned so providers can interpret cloud placeholders.
pub(crate) fn walk_files(root: &Path, excludes: &GlobSet) -> Vec<FoundFile> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || should_descend(e, excludes))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        if excludes.is_match(path) {
            continue;
        }
        let meta = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => continue,
        };
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        found.push(FoundFile {
            path: path.to_path_buf(),
            name: name.to_string(),
            size: meta.len(),
        });
    }
    found
}

fn should_descend(entry: &walkdir::DirEntry, excludes: &GlobSet) -> bool {
    if excludes.is_match(entry.path()) {
        return false;
    }
    !(entry.file_type().is_dir() && is_hidden(entry.path()))
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

pub(crate) fn remove_file(path: &Path, use_trash: bool) -> Result<(), ProviderError> {
    if use_trash {
        trash::delete(path).map_err(|e| ProviderError::Trash(e.to_string()))?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}
