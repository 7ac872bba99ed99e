//! Tests for error types

use anyhow::Context;
use inventory_batcher::config::InventoryConfig;
use inventory_batcher::core::{AppResult, BootstrapError, BootstrapStage, ReportError, SchedulerError};

#[test]
fn test_transport_error() {
    let err = ReportError::Transport("connection refused".to_string());
    assert_eq!(format!("{}", err), "transport error: connection refused");
}

#[test]
fn test_status_error() {
    let err = ReportError::Status {
        status: 503,
        body: "busy".to_string(),
    };
    assert_eq!(format!("{}", err), "inventory responded 503: busy");
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("port must be greater than 0".to_string());
    assert_eq!(format!("{}", err), "invalid config: port must be greater than 0");
}

#[test]
fn test_bootstrap_error_names_stage() {
    let err = BootstrapError {
        stage: BootstrapStage::RootResource,
        cause: ReportError::Cancelled,
    };
    assert_eq!(
        format!("{}", err),
        "bootstrap failed creating root resource: report cancelled"
    );
}

fn load(input: &str) -> AppResult<InventoryConfig> {
    InventoryConfig::from_json_str(input)
        .map_err(SchedulerError::InvalidConfig)
        .context("loading inventory config")
}

#[test]
fn test_app_result_carries_context() {
    let err = load(r#"{"port": 0}"#).unwrap_err();
    assert_eq!(err.to_string(), "loading inventory config");
    let root = err.downcast_ref::<SchedulerError>().unwrap();
    assert!(matches!(root, SchedulerError::InvalidConfig(_)));
}
