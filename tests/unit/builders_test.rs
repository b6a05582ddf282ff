//! Tests for builder modules

use std::sync::Arc;
use std::time::Duration;

use prometheus_slot_rotation::builders::{build_engine, build_on_current_runtime};
use prometheus_slot_rotation::config::EngineConfig;
use prometheus_slot_rotation::infra::{InMemoryLedger, InMemoryNotifier, InMemoryResourceClient};

#[test]
fn test_build_engine_applies_timeout() {
    let ledger = Arc::new(InMemoryLedger::new());
    let cfg = EngineConfig {
        call_timeout_ms: 750,
        ..EngineConfig::default()
    };
    let engine = build_engine(
        &cfg,
        Arc::new(InMemoryResourceClient::new()),
        ledger.clone(),
        ledger,
    )
    .unwrap();
    assert_eq!(engine.call_timeout(), Duration::from_millis(750));
}

#[test]
fn test_build_engine_rejects_invalid_config() {
    let ledger = Arc::new(InMemoryLedger::new());
    let cfg = EngineConfig {
        default_slots: 0,
        ..EngineConfig::default()
    };
    let result = build_engine(
        &cfg,
        Arc::new(InMemoryResourceClient::new()),
        ledger.clone(),
        ledger,
    );
    assert!(result.is_err());
}

#[test]
fn test_build_on_current_runtime_requires_runtime() {
    let ledger = Arc::new(InMemoryLedger::new());
    let result = build_on_current_runtime(
        EngineConfig::default(),
        Arc::new(InMemoryResourceClient::new()),
        ledger.clone(),
        ledger,
        Arc::new(InMemoryNotifier::new()),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn test_build_on_current_runtime_keeps_config() {
    let ledger = Arc::new(InMemoryLedger::new());
    let cfg = EngineConfig {
        item_label: "emote".to_string(),
        ..EngineConfig::default()
    };
    let service = build_on_current_runtime(
        cfg,
        Arc::new(InMemoryResourceClient::new()),
        ledger.clone(),
        ledger,
        Arc::new(InMemoryNotifier::new()),
    )
    .unwrap();
    assert_eq!(service.config().item_label, "emote");
    assert!(service.locks().is_empty());
}
