use providers::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a document could not be moved into the archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("document has no date")]
    MissingDate,
    #[error("document has no description")]
    MissingDescription,
    #[error("document has no tags")]
    MissingTags,
    #[error("{0} already exists in the archive")]
    DestinationAlreadyExists(PathBuf),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no folder provider can serve {0}")]
    ProviderUnavailable(PathBuf),
    #[error("no document at {0}")]
    DocumentNotFound(PathBuf),
    #[error("document store needs a tokio runtime: {0}")]
    NoRuntime(String),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
