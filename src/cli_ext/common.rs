//! Shared handler plumbing: config + store + recomputed dataset.

use anyhow::Result;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;

use crate::core::dataset;
use crate::core::model::Issue;
use crate::infra::config::{self, Config};
use crate::infra::store::Store;

/// Everything a read-side command needs, loaded once per invocation.
pub struct LoadedData {
    pub config: Config,
    pub store: Store,
    pub issues: Vec<Issue>,
    pub synced_at: Option<DateTime<Utc>>,
}

/// Load config and the cached feed, recomputing the derived dataset.
/// A missing cache yields an empty issue list, not an error.
pub fn load_dataset(now: DateTime<Utc>) -> Result<LoadedData> {
    let config = config::load_config().unwrap_or_default();
    let store = Store::new(&config.data_dir);

    let (issues, synced_at) = match store.load_rows()? {
        Some(snapshot) => (
            dataset::recompute(&snapshot.rows, now),
            Some(snapshot.synced_at),
        ),
        None => (Vec::new(), None),
    };

    Ok(LoadedData { config, store, issues, synced_at })
}

/// Standard empty-state message for read commands with no cached feed.
pub fn print_empty_state() {
    println!("No cached feed. Run `opd sync --input <file>` first.");
}

/// Risk value colored by band, or plain when colors are off.
pub fn paint_risk(risk: f64, no_color: bool) -> String {
    let text = format!("{risk:.1}");
    if no_color {
        return text;
    }
    if risk >= 7.0 {
        text.red().to_string()
    } else if risk >= 5.0 {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}
