pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::GitHubClient;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{etl::UpdateEngine, PaperPipeline};
pub use utils::error::{Result, UpdateError};
