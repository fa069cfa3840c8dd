//! Configuration management module
//!
//! Handles loading, validation, and management of console configuration.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Prompt shown in command mode
    pub prompt: String,

    /// Marker re-printed after messages while attached to a session
    pub attach_marker: String,

    /// Logging level
    pub log_level: String,

    /// File-based logging configuration
    pub log: LogConfig,

    /// Initial values for the session manager's option store
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Path to the log file; empty disables file logging
    pub file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "conmux> ".to_string(),
            attach_marker: ">> ".to_string(),
            log_level: "info".to_string(),
            log: LogConfig::default(),
            options: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        // CONMUX_PROMPT - command-mode prompt
        if let Ok(prompt) = env::var("CONMUX_PROMPT") {
            if !prompt.is_empty() {
                self.prompt = prompt;
            }
        }

        // CONMUX_LOG_LEVEL - logging level
        if let Ok(log_level) = env::var("CONMUX_LOG_LEVEL") {
            self.log_level = log_level;
        }

        // CONMUX_LOG_FILE_PATH - logging destination file
        if let Ok(file_path) = env::var("CONMUX_LOG_FILE_PATH") {
            self.log.file_path = file_path;
        }
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(path).unwrap_or_else(|err| {
            tracing::warn!("Failed to load config: {}, using defaults", err);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.prompt.is_empty() {
            anyhow::bail!("Prompt must not be empty");
        }

        if self.attach_marker.is_empty() {
            anyhow::bail!("Attach marker must not be empty");
        }

        if self.log_level.is_empty() {
            anyhow::bail!("Log level must not be empty");
        }

        for name in self.options.keys() {
            if name.is_empty() {
                anyhow::bail!("Option names must not be empty");
            }
        }

        Ok(())
    }
}
