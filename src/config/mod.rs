pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "slam-daily-update")]
#[command(about = "Collects open-source SLAM papers from GitHub into a Markdown table")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// GitHub personal access token; GITHUB_TOKEN is used when neither this
    /// flag nor the config file provides one
    #[arg(long)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long)]
    pub api_base: Option<String>,

    /// Directory holding the README and the processed ledger
    #[arg(long)]
    pub workdir: Option<String>,

    /// README file to update, relative to the working directory
    #[arg(long)]
    pub readme: Option<String>,

    /// Ledger of already processed repositories
    #[arg(long)]
    pub processed_file: Option<String>,

    /// Maximum number of new repositories handled per run
    #[arg(long)]
    pub max_repos: Option<usize>,

    /// Only handle repositories updated within the recent window
    #[arg(long)]
    pub only_recent: bool,

    /// Handle repositories even if the ledger already lists them
    #[arg(long)]
    pub include_processed: bool,

    /// Replace the table body instead of merging with existing rows
    #[arg(long)]
    pub replace_table: bool,

    /// Show what would be written without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Log CPU and memory usage after each phase
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Defaults, then the TOML file if one was given, then command line flags,
    /// with `GITHUB_TOKEN` as the last resort for the token.
    pub fn resolve(&self) -> Result<TomlConfig> {
        self.resolve_with_env_token(std::env::var("GITHUB_TOKEN").ok())
    }

    /// `env_token` only fills in a token that neither the file nor `--token` set.
    pub fn resolve_with_env_token(&self, env_token: Option<String>) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        if config.effective_token().is_none() {
            if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
                config.github.token = Some(token);
            }
        }
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(token) = &self.token {
            config.github.token = Some(token.clone());
        }
        if let Some(api_base) = &self.api_base {
            config.github.api_base = api_base.clone();
        }
        if let Some(workdir) = &self.workdir {
            config.output.workdir = workdir.clone();
        }
        if let Some(readme) = &self.readme {
            config.output.readme_path = readme.clone();
        }
        if let Some(processed_file) = &self.processed_file {
            config.output.processed_file = processed_file.clone();
        }
        if let Some(max_repos) = self.max_repos {
            config.filter.max_repos_per_run = max_repos;
        }
        if self.only_recent {
            config.filter.only_recently_updated = true;
        }
        if self.include_processed {
            config.filter.skip_processed = false;
        }
        if self.replace_table {
            config.output.keep_existing_rows = false;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
    }
}
