//! # Configuration
//!
//! Settings for the treefilter binary, layered lowest to highest:
//!
//! 1. Built-in defaults
//! 2. `treefilter.toml` (or the file given with `--config`)
//! 3. `TREEFILTER_*` environment variables
//! 4. Command-line flags (applied by the CLI module)
//!
//! ## Environment Variables
//!
//! - `TREEFILTER_HOST`, `TREEFILTER_PORT`: server bind address
//! - `TREEFILTER_API_KEY`: if set, requires Bearer token authentication
//! - `TREEFILTER_CORS_ORIGINS`: comma-separated allowed origins, or "*" for all
//! - `TREEFILTER_LOG_FORMAT`: "text" (default) or "json"

use serde::{Deserialize, Serialize};
use std::path::Path;
use treefilter_core::FilterError;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "treefilter.toml";

/// Default request body limit (2 MB).
const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

// =============================================================================
// CONFIG TYPES
// =============================================================================

/// Full application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub log: LogConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on every route but `/health`.
    pub api_key: Option<String>,
    /// Allowed CORS origins. Empty means localhost only; `["*"]` allows all.
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            api_key: None,
            cors_origins: Vec::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "treefilter=info,treefilter_core=info,tower_http=debug".to_string(),
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, FilterError> {
        toml::from_str(contents).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Load configuration from a file and the process environment.
    ///
    /// An explicitly given file must exist. Without one, `treefilter.toml` in
    /// the working directory is used if present, defaults otherwise.
    ///
    /// Also returns the warnings from `apply_env`, to be logged once the
    /// subscriber is installed.
    pub fn load(path: Option<&Path>) -> Result<(Self, Vec<String>), FilterError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        let warnings = config.apply_env(|key| std::env::var(key).ok());
        Ok((config, warnings))
    }

    fn from_file(path: &Path) -> Result<Self, FilterError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FilterError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Override settings from `TREEFILTER_*` variables.
    ///
    /// Unparseable values are ignored and reported in the returned warnings.
    /// Empty strings count as unset.
    #[must_use]
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut warnings = Vec::new();

        if let Some(host) = get("TREEFILTER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("TREEFILTER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => {
                    warnings.push(format!("Ignoring invalid TREEFILTER_PORT '{}'", port));
                }
            }
        }
        if let Some(key) = get("TREEFILTER_API_KEY") {
            self.server.api_key = Some(key);
        }
        if let Some(origins) = get("TREEFILTER_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(format) = get("TREEFILTER_LOG_FORMAT") {
            match format.as_str() {
                "json" => self.log.format = LogFormat::Json,
                "text" => self.log.format = LogFormat::Text,
                other => {
                    warnings.push(format!("Ignoring invalid TREEFILTER_LOG_FORMAT '{}'", other));
                }
            }
        }

        warnings
    }

    /// `host:port` string for binding.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.server.api_key, None);
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("[server]\nport = 9000\n").expect("parse");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::from_toml_str("[server]\nprot = 9000\n");
        assert!(matches!(result, Err(FilterError::Config(_))));
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::from_toml_str(
            "[server]\nhost = \"0.0.0.0\"\nport = 9000\n[log]\nformat = \"text\"\n",
        )
        .expect("parse");

        let warnings = config.apply_env(env(&[
            ("TREEFILTER_PORT", "7000"),
            ("TREEFILTER_API_KEY", "secret"),
            ("TREEFILTER_CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("TREEFILTER_LOG_FORMAT", "json"),
        ]));

        assert_eq!(config.bind_address(), "0.0.0.0:7000");
        assert_eq!(config.server.api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.server.cors_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(warnings.is_empty());
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = Config::default();
        let warnings = config.apply_env(env(&[
            ("TREEFILTER_PORT", "not-a-port"),
            ("TREEFILTER_API_KEY", ""),
            ("TREEFILTER_LOG_FORMAT", "yaml"),
        ]));
        assert_eq!(config, Config::default());
        assert_eq!(
            warnings,
            vec![
                "Ignoring invalid TREEFILTER_PORT 'not-a-port'".to_string(),
                "Ignoring invalid TREEFILTER_LOG_FORMAT 'yaml'".to_string(),
            ]
        );
    }
}
