use crate::folder::{self, WatchedFolder};
use crate::types::{DownloadStatus, FileChangeEvent, FileDetails};
use crate::{ChangeHandler, FolderProvider, ProviderError, ProviderKind, ProviderOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Provider for a plain directory on local disk; every file is `Local`.
pub struct LocalFolderProvider {
    folder: Arc<WatchedFolder>,
    use_trash: bool,
}

impl LocalFolderProvider {
    pub fn new(
        root: PathBuf,
        handler: ChangeHandler,
        options: &ProviderOptions,
    ) -> Result<Self, ProviderError> {
        let excludes = folder::build_globset(&options.exclude)?;
        let lister = Box::new(move |root: &Path| {
            let mut files: Vec<FileDetails> = folder::walk_files(root, &excludes)
                .into_iter()
                .filter(|f| !folder::is_hidden(&f.path))
                .map(|f| FileDetails {
                    path: f.path,
                    filename: f.name,
                    size: f.size,
                    download_status: DownloadStatus::Local,
                })
                .collect();
            files.sort_by(|a, b| a.path.cmp(&b.path));
            files
        });
        Ok(Self {
            folder: WatchedFolder::new(root, handler, lister),
            use_trash: options.use_trash,
        })
    }
}

impl FolderProvider for LocalFolderProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
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
        Err(ProviderError::NotSupported(format!(
            "{} is on local disk, nothing to download",
            of.display()
        )))
    }

    fn fetch(&self, path: &Path) -> Result<Vec<u8>, ProviderError> {
        Ok(fs::read(path)?)
    }

    fn delete(&self, path: &Path) -> Result<(), ProviderError> {
        folder::remove_file(path, self.use_trash)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), ProviderError> {
        fs::rename(from, to)?;
        Ok(())
    }
}
