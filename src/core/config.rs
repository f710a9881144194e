//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Database used when nothing else is configured
pub const DEFAULT_DB_PATH: &str = "eagle_pm.db";

/// Address `epm serve` listens on by default
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(code(epm::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    #[diagnostic(
        code(epm::config::parse),
        help("expected YAML with optional `db_path` and `bind` keys")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

/// EPM configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub db_path: Option<PathBuf>,

    /// Listen address for the web front end
    pub bind: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Command-line flags are applied on top by the caller.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::global_config_path().as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Load from an explicit global config file and environment lookup
    pub fn load_from(
        global_path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/epm/config.yaml)
        if let Some(path) = global_path {
            if path.exists() {
                config.merge(Self::read_file(path)?);
            }
        }

        // 3. Environment variables
        if let Some(db_path) = env("EPM_DB_PATH").filter(|v| !v.is_empty()) {
            config.db_path = Some(PathBuf::from(db_path));
        }
        if let Some(bind) = env("EPM_BIND").filter(|v| !v.is_empty()) {
            config.bind = Some(bind);
        }

        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "epm")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.db_path.is_some() {
            self.db_path = other.db_path;
        }
        if other.bind.is_some() {
            self.bind = other.bind;
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    pub fn bind(&self) -> String {
        self.bind.clone().unwrap_or_else(|| DEFAULT_BIND.to_string())
    }
}
