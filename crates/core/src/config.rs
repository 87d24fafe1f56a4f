//! Configuration management for launchpad nodes.

use crate::error::ConfigError;
use crate::log::DEFAULT_CHANGE_BUFFER;
use serde::{Deserialize, Serialize};
#[cfg(feature = "toml")]
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub node: NodeConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Local stream id in the event log
    pub node_id: String,
    /// Launchpad this node operates
    pub launchpad_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the log change feed before subscribers lag and refold
    pub change_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            change_buffer: DEFAULT_CHANGE_BUFFER,
        }
    }
}

impl Config {
    #[cfg(feature = "toml")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            node: NodeConfig {
                node_id: "node-001".to_string(),
                launchpad_id: "Launchpad-01".to_string(),
            },
            log: LogConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.node_id.trim().is_empty() {
            return Err(ConfigError::Invalid("node.node_id must not be empty".into()));
        }
        if self.node.launchpad_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "node.launchpad_id must not be empty".into(),
            ));
        }
        if self.engine.change_buffer == 0 {
            return Err(ConfigError::Invalid(
                "engine.change_buffer must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
