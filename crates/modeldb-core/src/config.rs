//! Syncer configuration model.
//!
//! Loading from disk and environment lives in `modeldb-infrastructure`;
//! this module only defines the shape and its defaults.

use crate::context::{ExperimentConfig, ExperimentRunConfig, ProjectConfig};
use crate::registry::DEFAULT_WARN_THRESHOLD;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6543;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_warn_threshold")]
    pub registry_warn_threshold: usize,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub run: ExperimentRunConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_warn_threshold() -> usize {
    DEFAULT_WARN_THRESHOLD
}

impl Default for SyncerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            registry_warn_threshold: default_warn_threshold(),
            project: ProjectConfig::default(),
            experiment: ExperimentConfig::default(),
            run: ExperimentRunConfig::default(),
        }
    }
}

impl SyncerConfig {
    /// `host:port` of the metadata store.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: SyncerConfig = toml::from_str("").unwrap();
        assert_eq!(config, SyncerConfig::default());
        assert_eq!(config.address(), "localhost:6543");
    }

    #[test]
    fn sections_override_defaults() {
        let config: SyncerConfig = toml::from_str(
            r#"
            host = "modeldb.internal"

            [project]
            kind = "existing"
            id = 9

            [experiment]
            kind = "new"
            name = "baseline"
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "modeldb.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.project, ProjectConfig::Existing { id: 9 });
        assert_eq!(config.run, ExperimentRunConfig::default());
    }
}
