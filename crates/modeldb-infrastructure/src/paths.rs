//! Path management for syncer configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/modeldb/           # Config directory (platform config dir)
//! └── syncer.toml              # Syncer configuration
//! ```

use modeldb_core::error::{ModelDbError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "modeldb";
const CONFIG_FILE: &str = "syncer.toml";

pub struct SyncerPaths;

impl SyncerPaths {
    /// Returns the syncer configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/modeldb/`)
    /// - `Err(ModelDbError::Config)`: Could not determine the platform config directory
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ModelDbError::config("Cannot find configuration directory"))
    }

    /// Returns the default configuration file path.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let Ok(config_file) = SyncerPaths::config_file() else {
            // No config dir on this platform/user; nothing to check.
            return;
        };
        assert!(config_file.ends_with("syncer.toml"));
        let config_dir = SyncerPaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
        assert!(config_dir.ends_with("modeldb"));
    }
}
