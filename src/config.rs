//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::backend;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timesheet backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    /// Settings for [`backend::BackendClient`]
    pub fn client_config(&self) -> backend::BackendConfig {
        backend::BackendConfig {
            base_url: self.base_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

/// Durable store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("timesheet").join("store.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./timesheet_store.json".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("timesheet").join("config.toml")),
            Some(PathBuf::from("./timesheet.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Backend overrides
        if let Some(url) = var("TIMESHEET_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(timeout) = var("TIMESHEET_REQUEST_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => self.backend.request_timeout_secs = secs,
                Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid TIMESHEET_REQUEST_TIMEOUT"),
            }
        }

        // Store overrides
        if let Some(path) = var("TIMESHEET_STORE_PATH") {
            self.store.path = path;
        }

        // Logging overrides
        if let Some(level) = var("TIMESHEET_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TIMESHEET_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Timesheet Configuration
#
# Environment variables override these settings:
# - TIMESHEET_BACKEND_URL
# - TIMESHEET_REQUEST_TIMEOUT
# - TIMESHEET_STORE_PATH
# - TIMESHEET_LOG_LEVEL
# - TIMESHEET_LOG_FORMAT

[backend]
# Timesheet backend URL
base_url = "http://localhost:8080"

# Request timeout in seconds
request_timeout_secs = 30

[store]
# File holding the access token and the running timer between runs
path = "~/.local/share/timesheet/store.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/timesheet/timesheet.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[backend]\nbase_url = \"https://timesheets.example.com\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.backend.base_url, "https://timesheets.example.com");
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.store.path.ends_with("store.json"));
    }

    #[test]
    fn test_generated_default_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8080");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[backend\nbase_url = 1").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TIMESHEET_BACKEND_URL", "http://backend:9000"),
            ("TIMESHEET_REQUEST_TIMEOUT", "5"),
            ("TIMESHEET_STORE_PATH", "/tmp/ts.json"),
            ("TIMESHEET_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://backend:9000");
        assert_eq!(config.backend.request_timeout_secs, 5);
        assert_eq!(config.store.path, "/tmp/ts.json");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");

        let client = config.backend.client_config();
        assert_eq!(client.base_url, "http://backend:9000");
        assert_eq!(client.request_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_timeout_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == "TIMESHEET_REQUEST_TIMEOUT").then(|| "soon".to_string())
        });
        assert_eq!(config.backend.request_timeout_secs, 30);
    }
}
