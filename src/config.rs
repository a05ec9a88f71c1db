//! Configuration management for the MCP tool server.
//!
//! This module handles server configuration including HTTP binding,
//! authorized keys and logging. Configuration is loaded once at startup,
//! optionally overridden from the command line, and never mutated while the
//! server runs.

use crate::auth::AuthorizedKeySet;
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server information
    #[serde(default)]
    pub server: ServerConfig,

    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Authorization configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Server version
    #[serde(default = "default_server_version")]
    pub version: String,

    /// Server description/instructions
    pub instructions: Option<String>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Number of worker threads (actix default when unset)
    pub workers: Option<usize>,
}

/// Authorization configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Authorized keys. An empty list puts the server in open mode.
    #[serde(default)]
    pub api_keys: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

/// Log format enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

// Default value functions
fn default_server_name() -> String {
    crate::SERVER_NAME.to_string()
}
fn default_server_version() -> String {
    crate::SERVER_VERSION.to_string()
}
fn default_bind_address() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_enable_cors() -> bool {
    true
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
            instructions: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            enable_cors: default_enable_cors(),
            cors_origins: default_cors_origins(),
            workers: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl HttpConfig {
    /// `host:port` string suitable for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ServerError::Config(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ServerError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ServerError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Whether no keys are configured and every request will be accepted
    pub fn is_open_mode(&self) -> bool {
        self.auth.api_keys.is_empty()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.bind_address.trim().is_empty() {
            return Err(ServerError::Config(
                "HTTP bind address cannot be empty".to_string(),
            ));
        }

        if self.http.port == 0 {
            return Err(ServerError::Config("HTTP port cannot be 0".to_string()));
        }

        if self.http.workers == Some(0) {
            return Err(ServerError::Config(
                "HTTP worker count must be at least 1".to_string(),
            ));
        }

        for origin in &self.http.cors_origins {
            if origin != "*" && url::Url::parse(origin).is_err() {
                return Err(ServerError::Config(format!(
                    "Invalid CORS origin: {}",
                    origin
                )));
            }
        }

        AuthorizedKeySet::new(self.auth.api_keys.iter().cloned())?;

        Ok(())
    }
}

/// Path of the config file written by `config` when no output is given
pub fn default_config_path() -> PathBuf {
    PathBuf::from("mcp-keygate.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid_open_mode() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.is_open_mode());
        assert_eq!(config.http.bind_addr(), "localhost:8000");
    }

    #[test]
    fn test_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.auth.api_keys = vec!["abc123".to_string(), "def456".to_string()];
        config.http.port = 9090;
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.auth.api_keys, config.auth.api_keys);
        assert_eq!(loaded.http.port, 9090);
        assert!(!loaded.is_open_mode());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            api_keys = ["abc123"]
            "#,
        )
        .unwrap();

        assert_eq!(config.http.port, 8000);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.auth.api_keys, vec!["abc123".to_string()]);
    }

    #[test]
    fn test_validate_rejects_bad_keys() {
        let mut config = Config::default();
        config.auth.api_keys = vec!["  ".to_string()];
        assert!(config.validate().is_err());

        config.auth.api_keys = vec!["abc".to_string(), "abc".to_string()];
        assert!(config.validate().is_err());

        config.auth.api_keys = vec![" abc".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_http() {
        let mut config = Config::default();
        config.http.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http.bind_address = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_cors_origin() {
        let mut config = Config::default();
        config.http.cors_origins = vec!["not an origin".to_string()];
        assert!(config.validate().is_err());

        config.http.cors_origins = vec!["https://example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = Config::from_file("/nonexistent/mcp-keygate.toml");
        assert!(matches!(result, Err(ServerError::Config(_))));
    }
}
