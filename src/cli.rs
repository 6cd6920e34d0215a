use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::model::{EventEnv, EventKind, ImpactType};
use crate::core::planner::ReleaseType;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "opsdeck")]
#[command(
    about = "A lightweight CLI dashboard engine for issue-tracker risk scoring, triage, and release planning"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress tables and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest the issue feed, recompute the dataset, and cache it
    Sync(SyncArgs),

    /// Show the dashboard: KPIs, module/priority breakdowns, clusters, trends
    Summary(SummaryArgs),

    /// Run a filter/sort query line over the cached dataset
    Query(QueryArgs),

    /// Rank open issues whose metadata looks inconsistent
    Triage(TriageArgs),

    /// Compare keyword frequency between the older and newer half of the data
    Trends(TrendsArgs),

    /// Group issues into fixed thematic buckets
    Clusters(ClustersArgs),

    /// Deep risk profile of one issue (weighted dimensions + labels)
    Profile(ProfileArgs),

    /// Manage operational calendar events
    Event(EventArgs),

    /// Assign issues to a release event
    Assign(AssignArgs),

    /// Suggest safe release time slots over a horizon
    Plan(PlanArgs),

    /// Export issues (optionally query-filtered) as CSV
    Export(ExportArgs),

    /// Initialize an opsdeck.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser)]
pub struct SyncArgs {
    /// Feed file (.csv or .json); falls back to the configured default
    #[arg(short, long)]
    pub input: Option<String>,

    /// Keep only the first N rows of the feed
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Parser)]
pub struct SummaryArgs {
    /// Emit JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct QueryArgs {
    /// Query line, e.g. "module:reporting risk>=8 last:7d sort:risk"
    pub query: String,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Cap the number of printed results
    #[arg(long, default_value = "50")]
    pub limit: usize,
}

#[derive(Parser)]
pub struct TriageArgs {
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct TrendsArgs {
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ClustersArgs {
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ProfileArgs {
    /// Issue id to profile
    pub id: String,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct EventArgs {
    #[command(subcommand)]
    pub command: EventSubcommand,
}

#[derive(Subcommand)]
pub enum EventSubcommand {
    /// Create a calendar event (title and start are required)
    Add(EventAddArgs),

    /// List events with computed risk and collision flags
    List(EventListArgs),

    /// Remove an event by id
    Remove(EventRemoveArgs),
}

#[derive(Parser)]
pub struct EventAddArgs {
    /// Event title
    #[arg(long)]
    pub title: String,

    /// Start time (e.g. "2026-03-01 22:00" or RFC 3339)
    #[arg(long)]
    pub start: String,

    /// Optional end time; defaults to the start for duration purposes
    #[arg(long)]
    pub end: Option<String>,

    /// Event type
    #[arg(long = "type", value_enum, default_value = "other")]
    pub kind: EventKindArg,

    /// Target environment
    #[arg(long, value_enum, default_value = "other")]
    pub env: EnvArg,

    /// Declared impact
    #[arg(long, value_enum, default_value = "no-downtime")]
    pub impact: ImpactArg,

    /// Comma-separated affected module names
    #[arg(long, default_value = "")]
    pub modules: String,

    /// Link to a single issue id
    #[arg(long)]
    pub issue: Option<String>,

    /// Owner on call for the event
    #[arg(long, default_value = "")]
    pub owner: String,

    /// Free-text status
    #[arg(long, default_value = "")]
    pub status: String,

    /// Free-text description
    #[arg(long, default_value = "")]
    pub description: String,

    /// All-day event
    #[arg(long)]
    pub all_day: bool,
}

#[derive(Parser)]
pub struct EventListArgs {
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct EventRemoveArgs {
    /// Event id to remove
    pub id: String,
}

#[derive(Parser)]
pub struct AssignArgs {
    /// Release event id
    #[arg(long)]
    pub release: String,

    /// Comma-separated issue ids to add (union with existing)
    #[arg(long)]
    pub issues: String,
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Target environment; falls back to the configured default
    #[arg(long, value_enum)]
    pub env: Option<EnvArg>,

    /// Release archetype
    #[arg(long = "release-type", value_enum, default_value = "patch")]
    pub release_type: ReleaseTypeArg,

    /// Comma-separated affected module names
    #[arg(long, default_value = "")]
    pub modules: String,

    /// Release description (scanned for risky terms)
    #[arg(long, default_value = "")]
    pub description: String,

    /// Days ahead to consider
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Maximum suggested slots per calendar day
    #[arg(long = "per-day")]
    pub per_day: Option<usize>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Optional query line restricting the exported set
    #[arg(long)]
    pub query: Option<String>,

    /// Output file path
    #[arg(short, long, default_value = "issues_export.csv")]
    pub output: PathBuf,

    /// Copy result to clipboard instead of writing a file
    #[arg(long)]
    pub clipboard: bool,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Overwrite an existing opsdeck.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EventKindArg {
    Deployment,
    Maintenance,
    Release,
    Other,
}

impl From<EventKindArg> for EventKind {
    fn from(value: EventKindArg) -> Self {
        match value {
            EventKindArg::Deployment => EventKind::Deployment,
            EventKindArg::Maintenance => EventKind::Maintenance,
            EventKindArg::Release => EventKind::Release,
            EventKindArg::Other => EventKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EnvArg {
    Prod,
    Staging,
    Dev,
    Other,
}

impl From<EnvArg> for EventEnv {
    fn from(value: EnvArg) -> Self {
        match value {
            EnvArg::Prod => EventEnv::Prod,
            EnvArg::Staging => EventEnv::Staging,
            EnvArg::Dev => EventEnv::Dev,
            EnvArg::Other => EventEnv::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImpactArg {
    NoDowntime,
    Internal,
    CustomerVisible,
    HighRisk,
}

impl From<ImpactArg> for ImpactType {
    fn from(value: ImpactArg) -> Self {
        match value {
            ImpactArg::NoDowntime => ImpactType::NoDowntime,
            ImpactArg::Internal => ImpactType::InternalOnly,
            ImpactArg::CustomerVisible => ImpactType::CustomerVisible,
            ImpactArg::HighRisk => ImpactType::HighRiskChange,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReleaseTypeArg {
    Major,
    Feature,
    Patch,
}

impl From<ReleaseTypeArg> for ReleaseType {
    fn from(value: ReleaseTypeArg) -> Self {
        match value {
            ReleaseTypeArg::Major => ReleaseType::Major,
            ReleaseTypeArg::Feature => ReleaseType::Feature,
            ReleaseTypeArg::Patch => ReleaseType::Patch,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
