//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `SYLO_` environment variables (`SYLO_STORE__KIND=sqlite`).

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sylo_core::logging_facility::Profile;
use sylo_engine::OrchestratorConfig;

pub const CONFIG_ENV: &str = "SYLO_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// SQLite database file, ignored by the memory store
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            path: PathBuf::from(".sylo/store.db"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub orchestrator: OrchestratorConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load the layered configuration
    ///
    /// `file` wins over `SYLO_CONFIG`. A `.env` file in the working directory
    /// is read first so its variables take part in the environment layer.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut builder = Config::builder();
        if let Some(path) = &file {
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml));
        }
        builder = builder.add_source(
            Environment::with_prefix("SYLO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .with_context(|| match &file {
                Some(path) => format!("failed to load configuration from {}", path.display()),
                None => "failed to load configuration from the environment".to_string(),
            })?;

        config
            .orchestrator
            .validate()
            .context("invalid orchestrator configuration")?;
        Ok(config)
    }
}
