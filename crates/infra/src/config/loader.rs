//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the base URL is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TRADEPORT_API_BASE_URL`: Application origin (required)
//! - `TRADEPORT_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `TRADEPORT_REFRESH_PATH`: Refresh endpoint path
//! - `TRADEPORT_USER_AGENT`: User agent sent with every request
//! - `TRADEPORT_STORAGE_BACKEND`: `memory`, `file` or `keychain`
//! - `TRADEPORT_STORAGE_PATH`: Token file for the `file` backend
//! - `TRADEPORT_KEYCHAIN_SERVICE`: Service name for the `keychain` backend
//! - `TRADEPORT_LOG_FILTER`: `EnvFilter` directive
//! - `TRADEPORT_LOG_FORMAT`: `pretty` or `json`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./tradeport.json` or `./tradeport.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use tradeport_domain::constants::{DEFAULT_REFRESH_PATH, DEFAULT_TIMEOUT_SECONDS};
use tradeport_domain::{
    ApiConfig, Config, LogFormat, LoggingConfig, Result, StorageBackend, StorageConfig,
    TradePortError,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required base
/// URL is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `TradePortError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `TRADEPORT_API_BASE_URL` is required; every other variable falls
/// back to its default.
///
/// # Errors
/// Returns `TradePortError::Config` if the base URL is missing or a variable
/// has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("TRADEPORT_API_BASE_URL")?;

    let timeout_seconds = match optional_env("TRADEPORT_API_TIMEOUT_SECS") {
        Some(raw) => raw.parse::<u64>().map_err(|e| {
            TradePortError::Config(format!("Invalid API timeout {raw:?}: {e}"))
        })?,
        None => DEFAULT_TIMEOUT_SECONDS,
    };

    let backend = match optional_env("TRADEPORT_STORAGE_BACKEND") {
        Some(raw) => raw.parse::<StorageBackend>().map_err(TradePortError::Config)?,
        None => StorageBackend::default(),
    };

    let format = match optional_env("TRADEPORT_LOG_FORMAT").map(|s| s.to_ascii_lowercase()) {
        None => LogFormat::default(),
        Some(raw) if raw == "pretty" => LogFormat::Pretty,
        Some(raw) if raw == "json" => LogFormat::Json,
        Some(raw) => {
            return Err(TradePortError::Config(format!("Invalid log format: {raw}")));
        }
    };

    let logging = LoggingConfig {
        filter: optional_env("TRADEPORT_LOG_FILTER").unwrap_or_else(|| LoggingConfig::default().filter),
        format,
    };

    Ok(Config {
        api: ApiConfig {
            base_url,
            refresh_path: optional_env("TRADEPORT_REFRESH_PATH")
                .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string()),
            timeout_seconds,
            user_agent: optional_env("TRADEPORT_USER_AGENT"),
        },
        storage: StorageConfig {
            backend,
            path: optional_env("TRADEPORT_STORAGE_PATH"),
            service: optional_env("TRADEPORT_KEYCHAIN_SERVICE"),
        },
        logging,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `TradePortError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TradePortError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TradePortError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TradePortError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TradePortError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TradePortError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TradePortError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, up to two parent directories and
/// the executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("tradeport.json"),
        dir.join("tradeport.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `TradePortError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    optional_env(key).ok_or_else(|| {
        TradePortError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Non-empty value of an environment variable
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: &[&str] = &[
        "TRADEPORT_API_BASE_URL",
        "TRADEPORT_API_TIMEOUT_SECS",
        "TRADEPORT_REFRESH_PATH",
        "TRADEPORT_USER_AGENT",
        "TRADEPORT_STORAGE_BACKEND",
        "TRADEPORT_STORAGE_PATH",
        "TRADEPORT_KEYCHAIN_SERVICE",
        "TRADEPORT_LOG_FILTER",
        "TRADEPORT_LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("TRADEPORT_API_BASE_URL", "https://market.example");
        std::env::set_var("TRADEPORT_API_TIMEOUT_SECS", "12");
        std::env::set_var("TRADEPORT_REFRESH_PATH", "/v2/auth/refresh");
        std::env::set_var("TRADEPORT_USER_AGENT", "tradeport-cli/0.1");
        std::env::set_var("TRADEPORT_STORAGE_BACKEND", "file");
        std::env::set_var("TRADEPORT_STORAGE_PATH", "/tmp/tradeport/session.json");
        std::env::set_var("TRADEPORT_LOG_FILTER", "tradeport_infra=debug");
        std::env::set_var("TRADEPORT_LOG_FORMAT", "JSON");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.api.base_url, "https://market.example");
        assert_eq!(config.api.timeout_seconds, 12);
        assert_eq!(config.api.refresh_path, "/v2/auth/refresh");
        assert_eq!(config.api.user_agent.as_deref(), Some("tradeport-cli/0.1"));
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.path.as_deref(), Some("/tmp/tradeport/session.json"));
        assert_eq!(config.logging.filter, "tradeport_infra=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_env_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("TRADEPORT_API_BASE_URL", "http://localhost:5000");
        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.api.refresh_path, "/api/auth/refresh");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, TradePortError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("TRADEPORT_API_BASE_URL", "https://market.example");
        std::env::set_var("TRADEPORT_API_TIMEOUT_SECS", "soon");
        assert!(matches!(load_from_env(), Err(TradePortError::Config(_))));

        std::env::remove_var("TRADEPORT_API_TIMEOUT_SECS");
        std::env::set_var("TRADEPORT_STORAGE_BACKEND", "cloud");
        assert!(matches!(load_from_env(), Err(TradePortError::Config(_))));

        std::env::remove_var("TRADEPORT_STORAGE_BACKEND");
        std::env::set_var("TRADEPORT_LOG_FORMAT", "xml");
        assert!(matches!(load_from_env(), Err(TradePortError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "api": { "base_url": "https://market.example", "timeout_seconds": 10 },
            "storage": { "backend": "file", "path": "session.json" }
        }"#;

        let mut temp_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();

        let config = load_from_file(Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.base_url, "https://market.example");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_load_from_file_toml() {
        let toml_content = r#"
            [api]
            base_url = "https://market.example"
            user_agent = "tradeport-cli/0.1"

            [logging]
            format = "json"
        "#;

        let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_from_file(Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.user_agent.as_deref(), Some("tradeport-cli/0.1"));
        assert_eq!(config.api.refresh_path, "/api/auth/refresh");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(TradePortError::Config(_))));
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_config("{ invalid json }", Path::new("test.json"));
        assert!(matches!(result, Err(TradePortError::Config(_))));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("api:\n  base_url: x", Path::new("test.yaml"));
        assert!(matches!(result, Err(TradePortError::Config(_))));
    }

    #[test]
    fn test_parse_config_requires_api_section() {
        let result = parse_config(r#"{ "logging": { "filter": "debug" } }"#, Path::new("c.json"));
        assert!(matches!(result, Err(TradePortError::Config(_))));
    }
}
