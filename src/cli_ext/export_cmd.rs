//! `export` command: flatten issues (optionally query-filtered) to CSV.

use std::fs;

use anyhow::{Context, Result};
use chrono::Utc;
use owo_colors::OwoColorize;

use crate::cli::{AppContext, ExportArgs};
use crate::cli_ext::common::{load_dataset, print_empty_state};
use crate::core::model::Issue;
use crate::core::{export, query};

pub fn run(args: ExportArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;
    if data.issues.is_empty() {
        print_empty_state();
        return Ok(());
    }

    let selected: Vec<&Issue> = match &args.query {
        Some(line) => query::run(&data.issues, &query::parse(line), now),
        None => data.issues.iter().collect(),
    };

    let records: Vec<export::Record> =
        selected.iter().map(|i| export::issue_record(i)).collect();
    let csv = export::to_csv(&records);

    if ctx.dry_run {
        if !ctx.quiet {
            println!("DRY RUN: Would export {} issues", records.len());
        }
        return Ok(());
    }

    if args.clipboard {
        export::copy_to_clipboard(&csv)?;
        return Ok(());
    }

    fs::write(&args.output, &csv)
        .with_context(|| format!("write {}", args.output.display()))?;
    if !ctx.quiet {
        println!("{} {} issues → {}", "✓".green(), records.len(), args.output.display());
    }
    Ok(())
}
