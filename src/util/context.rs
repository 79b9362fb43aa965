//! Global context for prefetch operations.
//!
//! Provides centralized access to configuration and the working directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_path, load_config, Config};

/// Process-wide settings shared by all commands.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Merged configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context, layering an explicit config file over the global one.
    pub fn with_config_file(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let global = global_config_path();
        let config = load_config(global.as_deref(), explicit)?;

        Ok(Self::with_cwd(cwd, config))
    }

    /// Create a context with explicit values.
    pub fn with_cwd(cwd: PathBuf, config: Config) -> Self {
        GlobalContext { cwd, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Resolve a user-supplied path against the working directory.
    ///
    /// Existing paths are canonicalized so later root checks compare real
    /// locations.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        joined.canonicalize().unwrap_or(joined)
    }
}
