//! CLI configuration file support
//!
//! Loads configuration from ~/.config/apiflow/config.toml

use anyhow::{Context, Result};
use apiflow_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Engine settings (`[executor]`, `[http]`, `[publish]`, `strict_edges`)
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for the daily log file (defaults to the platform data dir)
    pub dir: Option<PathBuf>,
    /// Filter used when APIFLOW_LOG is unset, e.g. "apiflow_core=debug"
    pub filter: Option<String>,
}

impl CliConfig {
    /// Load configuration from an explicit path, or the default path.
    ///
    /// An explicit file must exist and parse. The default file is optional
    /// and silently ignored when unreadable.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_strict(path),
            None => Ok(Self::load_from_path(Self::default_path())),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    fn load_strict(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("apiflow").join("config.toml"))
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log
            .dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|p| p.join("apiflow").join("logs")))
    }
}
