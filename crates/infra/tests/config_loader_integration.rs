//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! wiring a client from it.

use std::io::Write;

use tradeport_domain::{LogFormat, StorageBackend, TradePortError};
use tradeport_infra::{config, ApiClient, ApiError};

fn write_config(extension: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_json_file() {
    let file = write_config(
        ".json",
        r#"{
            "api": {
                "base_url": "https://market.example",
                "refresh_path": "/api/auth/refresh",
                "timeout_seconds": 15
            },
            "storage": { "backend": "memory" },
            "logging": { "filter": "tradeport_infra=debug", "format": "json" }
        }"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("config");

    assert_eq!(config.api.base_url, "https://market.example");
    assert_eq!(config.api.timeout_seconds, 15);
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.logging.format, LogFormat::Json);

    let client = ApiClient::from_config(&config).expect("client");
    assert_eq!(client.origin().base().as_str(), "https://market.example/");
}

#[test]
fn test_load_config_from_toml_file() {
    let file = write_config(
        ".toml",
        r#"
            [api]
            base_url = "http://localhost:5000"

            [storage]
            backend = "file"
            path = "/tmp/tradeport-session.json"
        "#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("config");

    assert_eq!(config.storage.backend, StorageBackend::File);
    assert_eq!(config.storage.path.as_deref(), Some("/tmp/tradeport-session.json"));
    assert!(ApiClient::from_config(&config).is_ok());
}

#[test]
fn test_invalid_base_url_is_rejected_when_wiring() {
    let file = write_config(".json", r#"{ "api": { "base_url": "market.example" } }"#);

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("config");
    let err = ApiClient::from_config(&config).unwrap_err();

    assert!(matches!(err, ApiError::Config(_)));
    assert!(matches!(TradePortError::from(err), TradePortError::Config(_)));
}

#[test]
fn test_malformed_toml_is_config_error() {
    let file = write_config(".toml", "[api\nbase_url = ");

    let result = config::load_from_file(Some(file.path().to_path_buf()));
    assert!(matches!(result, Err(TradePortError::Config(_))));
}
