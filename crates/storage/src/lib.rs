//! Storage layer: the soft JSON cache of the document collection.
//!
//! The cache is rewritten wholesale and may be deleted at any time; callers
//! treat every failure here as recoverable.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache could not be decoded: {0}")]
    Decode(serde_json::Error),
    #[error("cache could not be encoded: {0}")]
    Encode(serde_json::Error),
}

/// Read the cache. A missing file is `Ok(None)`.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CacheError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let value = serde_json::from_slice(&data).map_err(CacheError::Decode)?;
    Ok(Some(value))
}

/// Write the cache through a sibling temp file and a rename, so readers
/// never observe a half-written file.
pub fn save<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let data = serde_json::to_vec(value).map_err(CacheError::Encode)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &data)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), bytes = data.len(), "cache written");
    Ok(())
}

/// Delete the cache; a missing file is not an error.
pub fn remove(path: &Path) -> Result<(), CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
