//! # Scoring Configuration
//!
//! Operator-side settings: where snapshots live, whether every change is
//! persisted immediately, how much of the log the console echoes, and the
//! default log filter.
//!
//! ```rust
//! use scoring_core::config::ScoringConfig;
//!
//! let config = ScoringConfig::default();
//! assert!(config.store.auto_save);
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "SCORING_CONFIG_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScoringConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot directory
    pub dir: PathBuf,
    /// Persist after every accepted change
    pub auto_save: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("innings"), auto_save: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Log entries echoed after each change
    pub recent_balls: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { recent_balls: 12 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl ScoringConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: display.clone(), source })?;
        let config = Self::from_yaml(&content)
            .map_err(|source| ConfigError::Parse { path: display, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Config named by `SCORING_CONFIG_PATH`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        Self::load(Path::new(path))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.dir must not be empty".into()));
        }
        if self.display.recent_balls == 0 {
            return Err(ConfigError::Invalid("display.recent_balls must be at least 1".into()));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must not be empty".into()));
        }
        Ok(())
    }
}
