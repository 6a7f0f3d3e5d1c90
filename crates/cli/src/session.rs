use anyhow::{Context, Result};
use archiver_core::config::AppConfig;
use archiver_core::dates::TextDateParser;
use archiver_core::extractor::text_source;
use archiver_core::{DocumentStore, StoreOptions};
use std::sync::Arc;
use tracing::debug;

/// Build the store for `cfg`, optionally overriding whether providers watch.
pub fn build_store(cfg: &AppConfig, watch: Option<bool>) -> Result<DocumentStore> {
    if cfg.archive.root.trim().is_empty() {
        anyhow::bail!("archive.root is not configured");
    }
    let mut options = StoreOptions::from_config(cfg);
    if let Some(watch) = watch {
        options.watch = watch;
    }
    let store = DocumentStore::new(
        options,
        text_source(cfg.parsing.text_source),
        Arc::new(TextDateParser),
    )?;
    Ok(store)
}

/// Open a store for a one-shot command: restore the last session's
/// metadata, scan every root and wait for content parsing to finish.
pub async fn open_store(cfg: &AppConfig) -> Result<DocumentStore> {
    let store = build_store(cfg, Some(false))?;
    store.load_cache();
    let roots = cfg.roots();
    store
        .configure(&roots)
        .with_context(|| format!("configuring {} folder(s)", roots.len()))?;
    store.settle().await;
    debug!(documents = store.snapshot().documents.len(), "store ready");
    Ok(store)
}
