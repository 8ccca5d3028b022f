//! Configuration file loading
//!
//! ```json
//! {
//!   "definitions_dir": "./definitions",
//!   "allow_unknown_fields": false,
//!   "bus_capacity": 1024,
//!   "log": {"level": "info", "format": "compact"}
//! }
//! ```
//!
//! Every key is optional.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "./nonobvious.json";

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level for this crate's targets; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding entity definition files
    #[serde(default = "default_definitions_dir")]
    pub definitions_dir: String,

    /// Keep undeclared keys on loaded entities instead of rejecting them
    #[serde(default)]
    pub allow_unknown_fields: bool,

    /// Buffered messages per bus topic
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_definitions_dir() -> String {
    "./definitions".to_string()
}

fn default_bus_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            definitions_dir: default_definitions_dir(),
            allow_unknown_fields: false,
            bus_capacity: default_bus_capacity(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.bus_capacity == 0 {
            return Err(ConfigError::Invalid("bus_capacity must be > 0".into()));
        }

        if self.definitions_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("definitions_dir must not be empty".into()));
        }

        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Invalid("log.level must not be empty".into()));
        }

        Ok(())
    }

    /// Definitions directory, resolved against `base` when relative
    pub fn definitions_path(&self, base: &Path) -> PathBuf {
        let dir = Path::new(&self.definitions_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base.join(dir)
        }
    }
}
