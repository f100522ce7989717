//! Framework configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `TRELLIS_LOG_LEVEL`, `TRELLIS_LOG_ENABLED`,
//!    `TRELLIS_REMOTE_ROOT`
//! 2. Config file named by `TRELLIS_CONFIG`, or `trellis.toml`
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "debug"
//!
//! [remote]
//! root_url = "/api/"
//! default_operation = "Items"
//!
//! [regions]
//! default_region = "main"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "trellis.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Gate for the framework logger
    pub enabled: bool,
    /// Default `env_logger` filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
        }
    }
}

/// Remote data configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Prefix for remote operation URLs
    pub root_url: String,
    /// Operation used when a remote view names none
    pub default_operation: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            root_url: "/api/".to_string(),
            default_operation: None,
        }
    }
}

/// Region configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    /// Region registered as the default at startup
    pub default_region: Option<String>,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            default_region: Some("main".to_string()),
        }
    }
}

/// Complete framework configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    pub logging: LoggingConfig,
    pub remote: RemoteConfig,
    pub regions: RegionsConfig,
    /// File the config was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl FrameworkConfig {
    /// Load configuration from all sources
    ///
    /// A missing `trellis.toml` yields defaults; a missing file named by
    /// `TRELLIS_CONFIG` is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("TRELLIS_CONFIG") {
            Ok(path) => Self::load_from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded trellis config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from `lookup` (the environment in [`load`](Self::load))
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("TRELLIS_LOG_LEVEL").filter(|level| !level.is_empty()) {
            self.logging.level = level;
        }

        if let Some(enabled) = lookup("TRELLIS_LOG_ENABLED") {
            match parse_flag(&enabled) {
                Some(enabled) => self.logging.enabled = enabled,
                None => log::warn!("Ignoring TRELLIS_LOG_ENABLED={}", enabled),
            }
        }

        if let Some(root) = lookup("TRELLIS_REMOTE_ROOT").filter(|root| !root.is_empty()) {
            self.remote.root_url = root;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FrameworkConfig::default();
        assert!(config.logging.enabled);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.remote.root_url, "/api/");
        assert_eq!(config.regions.default_region.as_deref(), Some("main"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FrameworkConfig::from_toml_str(
            r#"
            [remote]
            default_operation = "Items"
            "#,
        )
        .unwrap();

        assert_eq!(config.remote.default_operation.as_deref(), Some("Items"));
        assert_eq!(config.remote.root_url, "/api/");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            FrameworkConfig::from_toml_str("[logging\nlevel = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TRELLIS_LOG_LEVEL", "debug"),
            ("TRELLIS_LOG_ENABLED", "off"),
            ("TRELLIS_REMOTE_ROOT", "https://example.test/odata/"),
        ]
        .into_iter()
        .collect();

        let mut config = FrameworkConfig::default();
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.enabled);
        assert_eq!(config.remote.root_url, "https://example.test/odata/");
    }

    #[test]
    fn test_unparsable_flag_is_ignored() {
        let mut config = FrameworkConfig::default();
        config.apply_overrides(|key| (key == "TRELLIS_LOG_ENABLED").then(|| "maybe".to_string()));
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FrameworkConfig::load_from_file("/nonexistent/trellis.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
