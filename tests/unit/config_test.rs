//! Tests for configuration validation

use std::time::Duration;

use prometheus_slot_rotation::config::EngineConfig;

#[test]
fn test_default_config_is_valid() {
    let cfg = EngineConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.call_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.default_slots, 1);
    assert_eq!(cfg.item_label, "7tv emote");
}

#[test]
fn test_zero_timeout_is_invalid() {
    let cfg = EngineConfig {
        call_timeout_ms: 0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_zero_default_slots_is_invalid() {
    let cfg = EngineConfig {
        default_slots: 0,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_blank_internal_requester_is_invalid() {
    let cfg = EngineConfig {
        internal_requester_id: Some("  ".to_string()),
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "call_timeout_ms": 1500,
        "default_slots": 3,
        "internal_requester_id": "77829817"
    }"#;

    let cfg = EngineConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.call_timeout_ms, 1500);
    assert_eq!(cfg.default_slots, 3);
    assert_eq!(cfg.internal_requester_id.as_deref(), Some("77829817"));
    assert_eq!(cfg.item_link_prefix, "7tv.app/emotes/");
}

#[test]
fn test_config_from_json_rejects_invalid_values() {
    let json = r#"{ "call_timeout_ms": 0, "default_slots": 1 }"#;
    assert!(EngineConfig::from_json_str(json).is_err());
}

#[test]
fn test_config_from_vars() {
    let vars = [
        ("SLOT_ROTATION_CALL_TIMEOUT_MS", "250"),
        ("SLOT_ROTATION_ITEM_LABEL", "emote"),
        ("UNRELATED", "ignored"),
    ];
    let cfg = EngineConfig::from_vars(vars).unwrap();
    assert_eq!(cfg.call_timeout_ms, 250);
    assert_eq!(cfg.item_label, "emote");
    assert_eq!(cfg.default_slots, 1);
}

#[test]
fn test_config_from_vars_rejects_unparsable_number() {
    let vars = [("SLOT_ROTATION_DEFAULT_SLOTS", "many")];
    let err = EngineConfig::from_vars(vars).unwrap_err();
    assert!(err.contains("SLOT_ROTATION_DEFAULT_SLOTS"));
}
