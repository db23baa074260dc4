use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Optional config file picked up from the working directory.
pub const CONFIG_FILE: &str = "fleetpipe.json";

/// Table the loader replaces on each run.
pub const DEFAULT_TABLE: &str = "ships";

/// Connection parameters for the relational store. Always constructed
/// explicitly and passed into [`crate::store::pg::PgFleet::connect`]; core
/// logic never reads ambient state.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_port() -> u16 {
    5432
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl StoreConfig {
    /// Read the `DB_*` connection parameters from the environment.
    /// Returns `Ok(None)` when `DB_HOST` is unset (offline run); an
    /// incomplete set is a configuration error.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(host) = env::var("DB_HOST") else {
            return Ok(None);
        };
        let require = |key: &str| {
            env::var(key).map_err(|_| PipelineError::Config(format!("{key} is not set")))
        };
        let port = match env::var("DB_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| PipelineError::Config(format!("DB_PORT `{raw}`: {e}")))?,
            Err(_) => default_port(),
        };
        Ok(Some(Self {
            host,
            port,
            database: require("DB_NAME")?,
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
            table: env::var("DB_TABLE").unwrap_or_else(|_| default_table()),
        }))
    }
}

/// Effective configuration for one pipeline run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delimited source file with the seven positional ship columns.
    pub source: PathBuf,
    /// Directory the chart artifacts are written into.
    pub output_dir: PathBuf,
    /// Relational store; `None` keeps the run fully in memory.
    pub store: Option<StoreConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data/ship_data.csv"),
            output_dir: PathBuf::from("data"),
            store: None,
        }
    }
}

impl PipelineConfig {
    /// Assemble the run config: `fleetpipe.json` if present, then `DB_*`
    /// environment variables, then the optional source path argument.
    pub fn load(source_arg: Option<String>) -> Result<Self> {
        let mut cfg = match fs::read_to_string(CONFIG_FILE) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| PipelineError::Config(format!("{CONFIG_FILE}: {e}")))?,
            Err(_) => Self::default(),
        };
        if let Some(store) = StoreConfig::from_env()? {
            cfg.store = Some(store);
        }
        if let Some(path) = source_arg {
            cfg.source = PathBuf::from(path);
        }
        Ok(cfg)
    }
}
