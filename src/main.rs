use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use opsdeck::cli::{AppContext, Cli, Commands};
use opsdeck::cli_ext::{event_cmd, export_cmd, sync_cmd, view_cmd};

fn main() -> Result<()> {
    // OPSDECK_LOG=debug opd ... for engine-side tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("OPSDECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Sync(args) => sync_cmd::run(args, &ctx),
        Commands::Summary(args) => view_cmd::summary_run(args, &ctx),
        Commands::Query(args) => view_cmd::query_run(args, &ctx),
        Commands::Triage(args) => view_cmd::triage_run(args, &ctx),
        Commands::Trends(args) => view_cmd::trends_run(args, &ctx),
        Commands::Clusters(args) => view_cmd::clusters_run(args, &ctx),
        Commands::Profile(args) => view_cmd::profile_run(args, &ctx),
        Commands::Event(args) => event_cmd::run(args, &ctx),
        Commands::Assign(args) => event_cmd::assign_run(args, &ctx),
        Commands::Plan(args) => event_cmd::plan_run(args, &ctx),
        Commands::Export(args) => export_cmd::run(args, &ctx),
        Commands::Init(args) => opsdeck::infra::config::init(args, &ctx),
        Commands::Completions(args) => opsdeck::completion::run(args),
    }
}
