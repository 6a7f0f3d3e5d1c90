//! Provider for a cloud-synced folder tree.
//!
//! The sync client keeps files that are not materialized as hidden
//! placeholders named `.<name>.icloud`. Those are reported as `Remote` under the
//! real name; a placeholder for which a download was requested, or that exists
//! next to a partially written file, is reported as `Downloading`.

use crate::folder::{self, WatchedFolder};
use crate::types::{DownloadStatus, FileChangeEvent, FileDetails};
use crate::{ChangeHandler, FolderProvider, ProviderError, ProviderKind, ProviderOptions};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tracing::info;

const PLACEHOLDER_SUFFIX: &str = ".icloud";

pub struct SyncedFolderProvider {
    folder: Arc<WatchedFolder>,
    requested: Arc<Mutex<HashSet<PathBuf>>>,
    download_command: Vec<String>,
    use_trash: bool,
}

impl SyncedFolderProvider {
    pub fn new(
        root: PathBuf,
        handler: ChangeHandler,
        options: &ProviderOptions,
    ) -> Result<Self, ProviderError> {
        let excludes = folder::build_globset(&options.exclude)?;
        let requested: Arc<Mutex<HashSet<PathBuf>>> = Arc::default();
        let pending = requested.clone();

        let lister = Box::new(move |root: &Path| {
            let mut pending = match pending.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let mut by_path: BTreeMap<PathBuf, FileDetails> = BTreeMap::new();
            let mut placeholders: Vec<PathBuf> = Vec::new();

            for found in folder::walk_files(root, &excludes) {
                if let Some(real_name) = placeholder_target(&found.name) {
                    let real_path = found.path.with_file_name(&real_name);
                    placeholders.push(real_path.clone());
                    by_path.entry(real_path.clone()).or_insert(FileDetails {
                        path: real_path,
                        filename: real_name,
                        size: found.size,
                        download_status: DownloadStatus::Remote,
                    });
                } else if !folder::is_hidden(&found.path) {
                    by_path.insert(
                        found.path.clone(),
                        FileDetails {
                            path: found.path,
                            filename: found.name,
                            size: found.size,
                            download_status: DownloadStatus::Local,
                        },
                    );
                }
            }

            for path in &placeholders {
                if let Some(details) = by_path.get_mut(path) {
                    let partial = details.download_status == DownloadStatus::Local;
                    if partial || pending.contains(path) {
                        details.download_status = DownloadStatus::Downloading(0.0);
                    }
                }
            }
            // a request is done once its placeholder is gone
            pending.retain(|p| placeholders.contains(p));

            by_path.into_values().collect()
        });

        Ok(Self {
            folder: WatchedFolder::new(root, handler, lister),
            requested,
            download_command: options.download_command.clone(),
            use_trash: options.use_trash,
        })
    }

    fn placeholder_of(path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        Some(path.with_file_name(format!(".{name}{PLACEHOLDER_SUFFIX}")))
    }
}

/// `.<name>.icloud` -> `<name>`
fn placeholder_target(name: &str) -> Option<String> {
    let inner = name.strip_prefix('.')?.strip_suffix(PLACEHOLDER_SUFFIX)?;
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

impl FolderProvider for SyncedFolderProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Synced
    }

    fn root(&self) -> &Path {
        self.folder.root()
    }

    fn refresh(&self) -> Vec<FileChangeEvent> {
        self.folder.refresh()
    }

    fn watch(&self) -> Result<(), ProviderError> {
        self.folder.watch()
    }

    fn save(&self, data: &[u8], at: &Path) -> Result<(), ProviderError> {
        fs::write(at, data)?;
        Ok(())
    }

    fn start_download(&self, of: &Path) -> Result<(), ProviderError> {
        let Some((program, args)) = self.download_command.split_first() else {
            return Err(ProviderError::NotSupported(
                "no download command configured".to_string(),
            ));
        };
        let status = Command::new(program).args(args).arg(of).status()?;
        if !status.success() {
            return Err(ProviderError::Command(format!(
                "{program} exited with {status} for {}",
                of.display()
            )));
        }
        info!(path = %of.display(), "download requested");
        if let Ok(mut pending) = self.requested.lock() {
            pending.insert(of.to_path_buf());
        }
        Ok(())
    }

    fn fetch(&self, path: &Path) -> Result<Vec<u8>, ProviderError> {
        if !path.exists() {
            return Err(ProviderError::NotDownloaded(path.to_path_buf()));
        }
        Ok(fs::read(path)?)
    }

    fn delete(&self, path: &Path) -> Result<(), ProviderError> {
        if path.exists() {
            return folder::remove_file(path, self.use_trash);
        }
        match Self::placeholder_of(path) {
            Some(placeholder) if placeholder.exists() => {
                folder::remove_file(&placeholder, self.use_trash)
            }
            _ => Err(ProviderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), ProviderError> {
        if !from.exists() {
            return Err(ProviderError::NotDownloaded(from.to_path_buf()));
        }
        fs::rename(from, to)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(root: &Path, options: &ProviderOptions) -> SyncedFolderProvider {
        let handler: ChangeHandler = Arc::new(|_: &Path, _: Vec<FileChangeEvent>| {});
        SyncedFolderProvider::new(root.to_path_buf(), handler, options).unwrap()
    }

    fn added(events: &[FileChangeEvent]) -> Vec<FileDetails> {
        events
            .iter()
            .filter_map(|e| match e {
                FileChangeEvent::Added(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn placeholder_names() {
        assert_eq!(placeholder_target(".scan.pdf.icloud"), Some("scan.pdf".to_string()));
        assert_eq!(placeholder_target("scan.pdf.icloud"), None);
        assert_eq!(placeholder_target("..icloud"), None);
    }

    #[test]
    fn placeholders_are_remote_under_real_name() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(".bill.pdf.icloud"), "plist").unwrap();
        std::fs::write(temp.path().join("local.pdf"), "pdf").unwrap();

        let p = provider(temp.path(), &ProviderOptions::default());
        let files = added(&p.refresh());

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "bill.pdf");
        assert_eq!(files[0].path, temp.path().join("bill.pdf"));
        assert_eq!(files[0].download_status, DownloadStatus::Remote);
        assert_eq!(files[1].download_status, DownloadStatus::Local);
    }

    #[test]
    fn partial_file_next_to_placeholder_is_downloading() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(".bill.pdf.icloud"), "plist").unwrap();
        let p = provider(temp.path(), &ProviderOptions::default());
        p.refresh();

        std::fs::write(temp.path().join("bill.pdf"), "par").unwrap();
        let events = p.refresh();
        assert!(matches!(
            &events[..],
            [FileChangeEvent::Updated(d)] if d.download_status == DownloadStatus::Downloading(0.0)
        ));

        std::fs::remove_file(temp.path().join(".bill.pdf.icloud")).unwrap();
        let events = p.refresh();
        assert!(matches!(
            &events[..],
            [FileChangeEvent::Updated(d)] if d.download_status == DownloadStatus::Local
        ));
    }

    #[test]
    fn download_without_command_is_not_supported() {
        let temp = tempfile::tempdir().unwrap();
        let p = provider(temp.path(), &ProviderOptions::default());
        let err = p.start_download(&temp.path().join("bill.pdf")).unwrap_err();
        assert!(matches!(err, ProviderError::NotSupported(_)));
    }

    #[cfg(unix)]
    #[test]
    fn requested_download_is_reported_as_downloading() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(".bill.pdf.icloud"), "plist").unwrap();
        let options = ProviderOptions {
            download_command: vec!["true".to_string()],
            ..ProviderOptions::default()
        };
        let p = provider(temp.path(), &options);
        p.refresh();

        p.start_download(&temp.path().join("bill.pdf")).unwrap();
        let events = p.refresh();
        assert!(matches!(
            &events[..],
            [FileChangeEvent::Updated(d)] if matches!(d.download_status, DownloadStatus::Downloading(_))
        ));
    }

    #[test]
    fn fetch_of_remote_file_fails() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join(".bill.pdf.icloud"), "plist").unwrap();
        let p = provider(temp.path(), &ProviderOptions::default());
        let err = p.fetch(&temp.path().join("bill.pdf")).unwrap_err();
        assert!(matches!(err, ProviderError::NotDownloaded(_)));
    }
}
