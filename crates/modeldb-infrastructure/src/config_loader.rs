//! Loads the syncer configuration.
//!
//! Priority:
//! 1. Environment variables (`MODELDB_HOST`, `MODELDB_PORT`)
//! 2. The configuration file (explicit path, else the default location)
//! 3. Built-in defaults

use crate::paths::SyncerPaths;
use modeldb_core::config::SyncerConfig;
use modeldb_core::error::{ModelDbError, Result};
use std::fs;
use std::path::Path;

pub const HOST_ENV: &str = "MODELDB_HOST";
pub const PORT_ENV: &str = "MODELDB_PORT";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses the file at `path`. The file must exist.
    pub fn load(path: &Path) -> Result<SyncerConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            ModelDbError::config(format!(
                "Failed to read configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<SyncerConfig> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` if given, else the default location. A missing default
    /// file yields the built-in defaults; a missing explicit file is an
    /// error.
    pub fn load_or_default(path: Option<&Path>) -> Result<SyncerConfig> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = match SyncerPaths::config_file() {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("[ConfigLoader] {}; using defaults", e);
                return Ok(SyncerConfig::default());
            }
        };
        if default_path.exists() {
            tracing::debug!("[ConfigLoader] loading {}", default_path.display());
            Self::load(&default_path)
        } else {
            tracing::debug!(
                "[ConfigLoader] no configuration at {}; using defaults",
                default_path.display()
            );
            Ok(SyncerConfig::default())
        }
    }

    /// Applies host/port overrides from `lookup` (normally the process
    /// environment).
    pub fn apply_env_overrides<F>(config: &mut SyncerConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.is_empty()) {
            config.host = host;
        }
        if let Some(port) = lookup(PORT_ENV).filter(|p| !p.is_empty()) {
            config.port = port.parse().map_err(|_| {
                ModelDbError::config(format!("{PORT_ENV} must be a port number, got '{port}'"))
            })?;
        }
        Ok(())
    }

    /// File (or defaults) plus process environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<SyncerConfig> {
        let mut config = Self::load_or_default(path)?;
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        tracing::info!(
            "[ConfigLoader] resolved metadata store address {}",
            config.address()
        );
        Ok(config)
    }

    pub fn to_toml(config: &SyncerConfig) -> Result<String> {
        Ok(toml::to_string_pretty(config)?)
    }
}
