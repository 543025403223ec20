//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOG_FILTER, DEFAULT_REFRESH_PATH, DEFAULT_TIMEOUT_SECONDS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API endpoint configuration
///
/// `base_url` acts as the application origin: relative request targets are
/// resolved against it and only requests sharing its origin receive the
/// bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            refresh_path: default_refresh_path(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: None,
        }
    }
}

/// Where the token pair is persisted between runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local, lost on exit
    #[default]
    Memory,
    /// JSON document on disk
    File,
    /// Platform keychain
    Keychain,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "keychain" => Ok(Self::Keychain),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// Credential storage configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// File path for the `file` backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Service name for the `keychain` backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), format: LogFormat::Pretty }
    }
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

const fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "api": { "base_url": "https://market.example" } }"#)
                .unwrap();

        assert_eq!(config.api.base_url, "https://market.example");
        assert_eq!(config.api.refresh_path, "/api/auth/refresh");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn toml_storage_section() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://market.example"
            timeout_seconds = 5

            [storage]
            backend = "file"
            path = "/tmp/tradeport-tokens.json"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.path.as_deref(), Some("/tmp/tradeport-tokens.json"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn storage_backend_from_str() {
        assert_eq!("FILE".parse::<StorageBackend>(), Ok(StorageBackend::File));
        assert_eq!("keychain".parse::<StorageBackend>(), Ok(StorageBackend::Keychain));
        assert!("redis".parse::<StorageBackend>().is_err());
    }
}
