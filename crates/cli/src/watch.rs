use anyhow::{Context, Result};
use archiver_core::config::AppConfig;
use archiver_core::{ArchiveSnapshot, StoreState};
use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::session::build_store;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchSummary {
    pub state: String,
    pub documents: usize,
    pub untagged: usize,
    pub years: Vec<String>,
}

impl WatchSummary {
    pub fn of(snapshot: &ArchiveSnapshot) -> Self {
        let state = match snapshot.state {
            StoreState::Uninitialized => "uninitialized",
            StoreState::CachedDocuments => "cached",
            StoreState::Live => "live",
        };
        WatchSummary {
            state: state.to_string(),
            documents: snapshot.documents.len(),
            untagged: snapshot.untagged().count(),
            years: snapshot.years.iter().cloned().collect(),
        }
    }
}

impl fmt::Display for WatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} document(s), {} untagged, years: {}",
            self.state,
            self.documents,
            self.untagged,
            if self.years.is_empty() {
                "-".to_string()
            } else {
                self.years.join(" ")
            }
        )
    }
}

/// Index the configured folders and print a summary whenever the collection
/// changes, until interrupted.
pub async fn watch_folders(cfg: AppConfig, json: bool) -> Result<()> {
    let store = build_store(&cfg, Some(true))?;
    let mut updates = store.subscribe();

    let restored = store.load_cache();
    if restored > 0 {
        print_summary(&WatchSummary::of(&store.snapshot()), json)?;
    }

    let roots = cfg.roots();
    store
        .configure(&roots)
        .with_context(|| format!("configuring {} folder(s)", roots.len()))?;
    println!("Watching {} folder(s)...", roots.len());

    let mut last = None;
    loop {
        let summary = WatchSummary::of(&updates.borrow_and_update());
        if last.as_ref() != Some(&summary) {
            print_summary(&summary, json)?;
            last = Some(summary);
        }
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }
    store.settle().await;
    Ok(())
}

fn print_summary(summary: &WatchSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
