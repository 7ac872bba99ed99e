//! Tests for configuration validation

use inventory_batcher::config::{InventoryConfig, RetryConfig};

#[test]
fn test_default_config_is_valid() {
    let cfg = InventoryConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.batch_delay_secs, 1);
    assert_eq!(cfg.retry.max_attempts, None);
}

#[test]
fn test_invalid_port() {
    let cfg = InventoryConfig {
        port: 0,
        ..InventoryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_batch_delay() {
    let cfg = InventoryConfig {
        batch_delay_secs: 0,
        ..InventoryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_host() {
    let cfg = InventoryConfig {
        host: "  ".into(),
        ..InventoryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_inventory_uri() {
    let cfg = InventoryConfig {
        inventory_uri: "hawkular/inventory".into(),
        ..InventoryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_retry_bounds() {
    let cfg = InventoryConfig {
        retry: RetryConfig {
            base_delay_ms: 1_000,
            max_delay_ms: 10,
            ..RetryConfig::default()
        },
        ..InventoryConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = InventoryConfig {
        retry: RetryConfig {
            max_attempts: Some(0),
            ..RetryConfig::default()
        },
        ..InventoryConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "host": "inventory.example.com",
        "port": 443,
        "tenant": "ops",
        "http": { "ssl": true, "timeout_secs": 5 },
        "batch_delay_secs": 5,
        "retry": { "base_delay_ms": 250, "max_attempts": 10 }
    }"#;

    let cfg = InventoryConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.base_url(), "https://inventory.example.com:443");
    assert_eq!(cfg.tenant, "ops");
    assert_eq!(cfg.http.timeout_secs, 5);
    assert_eq!(cfg.http.connect_timeout_secs, 10);
    assert_eq!(cfg.retry.base_delay_ms, 250);
    assert_eq!(cfg.retry.max_delay_ms, 30_000);
    assert_eq!(cfg.retry.max_attempts, Some(10));
    assert_eq!(cfg.inventory_uri, "/hawkular/inventory");
}

#[test]
fn test_config_from_json_rejects_invalid() {
    let err = InventoryConfig::from_json_str(r#"{ "batch_delay_secs": 0 }"#).unwrap_err();
    assert!(err.contains("batch_delay_secs"));

    let err = InventoryConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}
