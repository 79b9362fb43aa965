//! Configuration file support.
//!
//! Configuration is read from two places:
//! - Global: `~/.yarn-prefetch/config.toml` - user-wide defaults
//! - Explicit: the file passed with `--config`
//!
//! The explicit file takes precedence. Nothing is read from the project
//! being prefetched, so a repository cannot pick the yarn executable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Network timeout passed to yarn, in milliseconds.
pub const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 600_000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Yarn settings
    pub yarn: YarnConfig,
}

/// Yarn-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct YarnConfig {
    /// Yarn executable (name looked up in PATH, or a path)
    pub program: Option<PathBuf>,

    /// Network timeout in milliseconds
    pub network_timeout: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.yarn.program.is_some() {
            self.yarn.program = other.yarn.program;
        }
        if other.yarn.network_timeout.is_some() {
            self.yarn.network_timeout = other.yarn.network_timeout;
        }
    }

    /// Yarn program to invoke.
    pub fn yarn_program(&self) -> PathBuf {
        self.yarn
            .program
            .clone()
            .unwrap_or_else(|| PathBuf::from("yarn"))
    }

    /// Network timeout in milliseconds.
    pub fn network_timeout_ms(&self) -> u64 {
        self.yarn
            .network_timeout
            .unwrap_or(DEFAULT_NETWORK_TIMEOUT_MS)
    }
}

/// Get the global config directory (~/.yarn-prefetch).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".yarn-prefetch"))
}

/// Get the global config path (~/.yarn-prefetch/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load the global config, then the explicit one on top of it.
///
/// An explicit path that cannot be read is an error; a missing or broken
/// global config falls back to defaults with a warning.
pub fn load_config(global_path: Option<&Path>, explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    if let Some(explicit_path) = explicit_path {
        config.merge(Config::load(explicit_path)?);
    }

    Ok(config)
}
