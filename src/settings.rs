use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "EXT";

/// Runtime settings. Defaults below, overridden by `EXT_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input_csv: PathBuf,
    pub stars_output: PathBuf,
    pub instructions_output: PathBuf,
    pub github_token: Option<String>,
    /// Pause after each uncached GitHub API call.
    pub request_delay_ms: u64,
    /// Concurrent README downloads.
    pub concurrency: usize,
    pub user_agent: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        defaults()?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read EXT_* environment")?
            .try_deserialize()
            .context("Invalid EXT_* configuration")
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("input_csv", "input/goose_extensions_curated.csv")?
        .set_default("stars_output", "input/goose_github_stars.json")?
        .set_default("instructions_output", "input/goose_installation_instructions.json")?
        .set_default("request_delay_ms", 1000i64)?
        .set_default("concurrency", 8i64)?
        .set_default(
            "user_agent",
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
        )?)
}
