//! Configuration loading and typed config structures for the catalog.
//!
//! The canonical configuration lives in `gamemaster-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads the file.

use std::path::Path;

use serde::Deserialize;

pub use gamemaster_db::DatabaseConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level catalog configuration.
///
/// Mirrors the structure of `gamemaster-config.yaml`. Every field has a
/// default, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// Backing store connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CatalogConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `DATABASE_URL` overrides `database.url` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.database.apply_env_overrides();
        Ok(config)
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Plain,
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CatalogConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Plain);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
database:
  max_connections: 12
  connect_timeout_secs: 2
  idle_timeout_secs: 60

logging:
  level: debug
  format: json
";
        let config = CatalogConfig::parse(yaml).unwrap();
        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.database.connect_timeout_secs, 2);
        assert_eq!(config.database.idle_timeout_secs, 60);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn empty_sections_fall_back_to_defaults() {
        let config = CatalogConfig::parse("logging:\n  level: warn\n").unwrap();
        assert_eq!(config.logging.format, LogFormat::Plain);
        assert_eq!(config.database.idle_timeout_secs, 300);
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = CatalogConfig::parse("database: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
