//! Configuration management for sleep-tracker.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::cli::Args;

/// Largest accepted UTC offset, in minutes.
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session database settings.
    pub database: DatabaseSection,
    /// Logging configuration.
    pub logging: LoggingSection,
    /// History rendering settings.
    pub display: DisplaySection,
}

/// Database configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file holding the sessions.
    pub path: PathBuf,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sleep-tracker.db"),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Display configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Offset from UTC, in minutes, used when printing timestamps.
    pub utc_offset_minutes: i32,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("SLEEP_TRACKER_DB") {
            if !path.is_empty() {
                self.database.path = PathBuf::from(path);
            }
        }

        if let Ok(offset) = std::env::var("SLEEP_TRACKER_UTC_OFFSET") {
            if let Ok(offset) = offset.parse() {
                self.display.utc_offset_minutes = offset;
            }
        }

        if let Ok(level) = std::env::var("SLEEP_TRACKER_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref path) = args.database {
            self.database.path = path.clone();
        }

        if let Some(offset) = args.utc_offset {
            self.display.utc_offset_minutes = offset;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);
        config.utc_offset()?;

        Ok(config)
    }

    /// The display offset as a chrono offset.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        let minutes = self.display.utc_offset_minutes;
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(ConfigError::InvalidOffset(minutes));
        }
        FixedOffset::east_opt(minutes * 60).ok_or(ConfigError::InvalidOffset(minutes))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// UTC offset outside +/-18 hours.
    InvalidOffset(i32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidOffset(minutes) => {
                write!(f, "invalid UTC offset: {} minutes", minutes)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
