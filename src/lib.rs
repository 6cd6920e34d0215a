//! **opsdeck** - Operations dashboard engine for issue-tracker risk scoring,
//! triage, and release planning.
//!
//! Pure heuristic core (normalization, scoring, clustering, trends, query
//! language, event/slot planning) with a thin CLI around it. Every public
//! engine function is data-in/data-out: the caller supplies the rows, the
//! events, and the clock.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Pure heuristic engine - normalization, scoring, analytics, planning
pub mod core {
    /// Issue/Event data shapes shared across the engine
    pub mod model;

    /// Raw row → typed issue normalization with tolerant field lookup
    pub mod normalize;

    /// Stopword-filtered tokenization and keyword ranking
    pub mod tokenize;

    /// Declarative keyword rule tables shared by scorers and classifiers
    pub mod rules;

    /// Risk strategies: bounded 1-10 scale and weighted dimensions
    pub mod risk;
    pub use risk::{BoundedScale, RiskStrategy, WeightedDimensions};

    /// Category inference, cluster buckets, ranked analytics labels
    pub mod classify;

    /// Emerging/stable theme detection over time windows
    pub mod trends;

    /// Inconsistency flags and the ranked triage queue
    pub mod triage;

    /// The filter/sort query mini-language
    pub mod query;

    /// Whole-dataset recompute pipeline and KPI aggregates
    pub mod dataset;

    /// Event validation, event risk scoring, collision detection
    pub mod events;

    /// Release slot generation and safety scoring
    pub mod planner;

    /// Flat-record CSV export
    pub mod export;
}

/// Infrastructure - Configuration, ingest, and snapshot persistence
pub mod infra {
    /// Configuration management with TOML support and env layering
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Feed file ingestion (CSV/JSON → raw rows)
    pub mod ingest;

    /// Atomic JSON snapshot store (rows cache, events, assignments)
    pub mod store;
    pub use store::Store;
}

/// CLI command handlers
pub mod cli_ext {
    /// Shared handler plumbing (config + store + dataset)
    pub mod common;

    /// Feed sync
    pub mod sync_cmd;

    /// Dashboard views: summary, query, triage, trends, clusters, profile
    pub mod view_cmd;

    /// Calendar: events, assignments, slot planning
    pub mod event_cmd;

    /// CSV export
    pub mod export_cmd;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use infra::{Config, Store, load_config};

// Core types for external consumers
pub use core::model::{Event, EventEnv, EventKind, ImpactType, Issue, RawRow};
pub use core::{BoundedScale, RiskStrategy, WeightedDimensions};
