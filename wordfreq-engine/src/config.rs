//! Configuration management for the wordfreq engine
//!
//! Minimal TOML bootstrap configuration with built-in defaults. Settings
//! sources priority:
//!
//! 1. Command-line arguments
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)

use std::path::Path;

use serde::Deserialize;
use tracing::warn;
use wordfreq_common::{Error, Result};

use crate::counter::{EmissionMode, ReadPolicy};

/// Engine configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the chunk / snapshot / result channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Policy for source-read failures
    #[serde(default)]
    pub read_policy: ReadPolicy,

    /// Snapshot emission mode
    #[serde(default)]
    pub emission_mode: EmissionMode,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_channel_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            read_policy: ReadPolicy::default(),
            emission_mode: EmissionMode::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|err| Error::Config(format!("{}: {err}", path.display())))
    }

    /// Load configuration from an optional TOML file, falling back to
    /// built-in defaults (with a warning) when absent or unreadable
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::load(path) {
                Ok(config) => config,
                Err(err) => {
                    warn!("using default configuration: {err}");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.read_policy, ReadPolicy::Strict);
        assert_eq!(config.emission_mode, EmissionMode::FinalOnly);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
            channel_capacity = 8
            read_policy = "lenient"
            emission_mode = "interactive"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.read_policy, ReadPolicy::Lenient);
        assert_eq!(config.emission_mode, EmissionMode::Interactive);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("channel_capacity = 4").unwrap();
        assert_eq!(config.channel_capacity, 4);
        assert_eq!(config.read_policy, ReadPolicy::Strict);
        assert_eq!(config.emission_mode, EmissionMode::FinalOnly);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = EngineConfig::load_or_default(Some(Path::new("/no/such/config.toml")));
        assert_eq!(config.channel_capacity, 64);
    }
}
