//! Configuration management for reelcast
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.
//!
//! ```toml
//! [scheduler]
//! search_budget = 20
//! tie_break = "incumbent"
//!
//! [[platforms]]
//! platform = "instagram"
//! start_hour = 18
//! end_hour = 23
//! min_gap_minutes = 60
//!
//! [database]
//! sqlite_path = "data/reelcast.db"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scheduler::{default_windows, PlatformWindow, SchedulerConfig, TieBreak, WindowTable};
use crate::server::config::{parse_bind_address, ServerConfig};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduler tuning
    pub scheduler: SchedulerConfig,

    /// Publishing windows, one per platform
    pub platforms: Vec<PlatformWindow>,

    /// Database configuration
    pub database: DatabaseConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/reelcast.db"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = SchedulerConfig::default();

        let buffer_minutes = std::env::var("REELCAST_BUFFER_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.buffer_minutes);

        let search_budget = std::env::var("REELCAST_SEARCH_BUDGET")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.search_budget);

        let tie_break = match std::env::var("REELCAST_TIE_BREAK") {
            Ok(v) => TieBreak::parse(&v)
                .with_context(|| format!("Invalid REELCAST_TIE_BREAK: {v}"))?,
            Err(_) => defaults.tie_break,
        };

        let tick_batch_size = std::env::var("REELCAST_TICK_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.tick_batch_size);

        let tick_interval_secs = std::env::var("REELCAST_TICK_INTERVAL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.tick_interval_secs);

        let sqlite_path = std::env::var("REELCAST_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/reelcast.db"))
            .into();

        let mut server = ServerConfig::default();
        if let Ok(addr) = std::env::var("REELCAST_BIND_ADDRESS") {
            server.bind_address = parse_bind_address(&addr)?;
        }
        if let Some(enable) = std::env::var("REELCAST_ENABLE_CORS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
        {
            server.enable_cors = enable;
        }

        let log_level =
            std::env::var("REELCAST_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("REELCAST_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            scheduler: SchedulerConfig {
                buffer_minutes,
                search_budget,
                tie_break,
                tick_batch_size,
                tick_interval_secs,
            },
            platforms: default_windows(),
            database: DatabaseConfig { sqlite_path },
            server,
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate()?;

        if self.platforms.is_empty() {
            anyhow::bail!("at least one platform window must be configured");
        }

        self.window_table()?;

        if !matches!(self.logging.format.as_str(), "text" | "json" | "pretty") {
            anyhow::bail!(
                "logging.format must be text, json or pretty, got '{}'",
                self.logging.format
            );
        }

        Ok(())
    }

    /// Build the validated window table
    pub fn window_table(&self) -> Result<WindowTable> {
        WindowTable::new(self.platforms.iter().copied()).context("Invalid platform window")
    }

    /// Get tick interval as Duration
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.tick_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            platforms: default_windows(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidValue { field: String, reason: String },
    MissingField { field: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            Self::MissingField { field } => {
                write!(f, "Missing required field: {}", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
