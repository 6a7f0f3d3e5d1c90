//! Moving a described document to `<archive>/<year>/<canonical filename>`.

use crate::error::ArchiveError;
use crate::filename;
use crate::models::Document;
use providers::FolderProvider;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where a document would be archived, relative to the archive root:
/// the year folder and the canonical filename.
pub fn renaming_path(
    document: &Document,
    description: &str,
    tags: &BTreeSet<String>,
) -> Result<(String, String), ArchiveError> {
    let date = document.date.ok_or(ArchiveError::MissingDate)?;
    if tags.is_empty() {
        return Err(ArchiveError::MissingTags);
    }
    if description.is_empty() {
        return Err(ArchiveError::MissingDescription);
    }
    let folder = date.format("%Y").to_string();
    let name = filename::create_filename(date, Some(description), tags);
    Ok((folder, name))
}

/// Validate, then move the document's file into the archive and point the
/// document at its new path. On error nothing on disk or in `document`
/// has changed.
pub fn archive_document(
    document: &mut Document,
    archive_root: &Path,
    provider: &dyn FolderProvider,
    slugify: bool,
) -> Result<PathBuf, ArchiveError> {
    let (description, tags) = if slugify {
        let description = filename::slugify(document.description(), "-").to_lowercase();
        let tags: BTreeSet<String> = document
            .tags
            .iter()
            .map(|t| filename::slugify(t, "").to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        (description, tags)
    } else {
        (document.description().to_string(), document.tags.clone())
    };

    let (folder, name) = renaming_path(document, &description, &tags)?;
    let folder = archive_root.join(folder);
    let destination = folder.join(&name);

    if destination != document.path() {
        if provider.exists(&destination) {
            return Err(ArchiveError::DestinationAlreadyExists(destination));
        }
        if !provider.exists(&folder) {
            provider.create_folder(&folder)?;
        }
        provider.rename(document.path(), &destination)?;
        info!(
            from = %document.path().display(),
            to = %destination.display(),
            "document archived"
        );
    }

    document.set_description(&description);
    document.tags = tags;
    document.set_path(destination.clone());

    let tag_list: Vec<String> = document.tags.iter().cloned().collect();
    if let Err(e) = provider.save_tags(&destination, &tag_list) {
        warn!(path = %destination.display(), error = %e, "could not attach file tags");
    }
    Ok(destination)
}
