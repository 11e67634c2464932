//! Configuration management for tasksync
//!
//! This module handles loading, parsing, and validation of configuration files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Sync engine tunables.
///
/// The retry ceiling and batch size are deliberately configuration, not
/// invariants: batches exist only to bound per-request payload size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum queue items submitted per remote request
    pub batch_size: usize,
    /// Attempts before a queue item is declared permanently failed
    pub max_retries: u32,
    /// Timeout for the connectivity probe and each remote call, in seconds
    pub remote_timeout_seconds: u64,
    /// Auto-sync interval in seconds (0 = disabled, manual sync only)
    pub auto_sync_interval_seconds: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path; defaults to the platform data directory when unset
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log file path; stderr when unset
    pub file: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_retries: 3,
            remote_timeout_seconds: 5,
            auto_sync_interval_seconds: 300,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("tasksync").join("config.toml"))
    }

    /// Default database file location.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage.path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("could not determine data directory")?;
        Ok(data_dir.join("tasksync").join("tasks.db"))
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.sync.batch_size == 0 {
            anyhow::bail!("sync.batch_size must be at least 1");
        }
        if self.sync.max_retries == 0 {
            anyhow::bail!("sync.max_retries must be at least 1");
        }
        if self.sync.remote_timeout_seconds == 0 {
            anyhow::bail!("sync.remote_timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Write a default configuration file, creating parent directories.
    pub fn generate_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
        }

        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).context("failed to serialize default config")?;
        let content = format!("# tasksync Configuration File\n# Generated automatically; edit as needed.\n\n{toml_str}");

        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
