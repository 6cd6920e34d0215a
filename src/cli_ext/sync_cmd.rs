//! `sync` command: ingest the feed file, recompute the dataset, persist
//! the raw-row cache.

use anyhow::{Result, bail};
use chrono::Utc;
use owo_colors::OwoColorize;
use tracing::info;

use crate::cli::{AppContext, SyncArgs};
use crate::core::dataset;
use crate::infra::config::{self, expand_path};
use crate::infra::ingest;
use crate::infra::store::Store;

pub fn run(args: SyncArgs, ctx: &AppContext) -> Result<()> {
    let cfg = config::load_config().unwrap_or_default();

    let input = match args.input.or(cfg.feed.input) {
        Some(path) => expand_path(&path),
        None => bail!("no feed file given (use --input or set feed.input in opsdeck.toml)"),
    };

    if ctx.dry_run {
        if !ctx.quiet {
            println!("DRY RUN: Would ingest {}", input.display());
        }
        return Ok(());
    }

    let mut rows = ingest::read_rows(&input)?;
    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }

    let now = Utc::now();
    let issues = dataset::recompute(&rows, now);
    let dropped = rows.len() - issues.len();

    let store = Store::new(&cfg.data_dir);
    store.save_rows(&rows, now)?;
    info!(rows = rows.len(), issues = issues.len(), dropped, "feed synced");

    if !ctx.quiet {
        let kpis = dataset::kpis(&issues);
        println!(
            "{} {} rows → {} issues ({} open, {} closed, {} dropped without id)",
            "✓".green(),
            rows.len(),
            issues.len(),
            kpis.open,
            kpis.closed,
            dropped
        );
    }
    Ok(())
}
