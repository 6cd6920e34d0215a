use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config
{
    /// Where snapshot blobs live (rows cache, events, assignments)
    pub data_dir: PathBuf,

    /// Default feed settings
    pub feed: FeedConfig,

    /// Default release planner settings
    pub planner: PlannerConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedConfig
{
    /// Default input file for `sync` when --input is omitted
    pub input: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlannerConfig
{
    pub horizon_days: u32,
    pub max_slots_per_day: usize,
    pub default_env: String,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            data_dir: PathBuf::from(".opsdeck"),
            feed: FeedConfig { input: None },
            planner: PlannerConfig {
                horizon_days: 7,
                max_slots_per_day: 2,
                default_env: "prod".to_string(),
            },
        }
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["opsdeck.toml", ".opsdeck.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with OPSDECK_ prefix
    builder = builder.add_source(config::Environment::with_prefix("OPSDECK").separator("_"));

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

/// Resolve a user-supplied path, expanding `~` and env vars.
pub fn expand_path(raw: &str) -> PathBuf
{
    PathBuf::from(
        shellexpand::full(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
    )
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let path = Path::new("opsdeck.toml");

    if path.exists() && !args.force
    {
        anyhow::bail!("opsdeck.toml already exists (use --force to overwrite)");
    }

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("DRY RUN: Would write {}", path.display());
        }
        return Ok(());
    }

    let rendered = toml::to_string_pretty(&Config::default())
        .context("Failed to serialize default configuration")?;
    fs::write(path, rendered).context("Failed to write opsdeck.toml")?;

    if !ctx.quiet
    {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn defaults_are_sensible()
    {
        let cfg = Config::default();
        assert_eq!(cfg.data_dir, PathBuf::from(".opsdeck"));
        assert_eq!(cfg.planner.horizon_days, 7);
        assert_eq!(cfg.planner.max_slots_per_day, 2);
    }

    #[test]
    fn default_config_round_trips_through_toml()
    {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.planner.default_env, "prod");
    }
}
