//! Tests for error types

use prometheus_slot_rotation::core::{
    AdmissionError, ExternalError, ExternalPhase, LedgerError,
};
use prometheus_slot_rotation::util::Item;

#[test]
fn test_blocked_error() {
    let err = AdmissionError::ItemBlocked {
        item_id: "abc".to_string(),
    };
    assert_eq!(format!("{}", err), "item abc is blocked");
    assert!(err.is_rejection());
    assert!(!err.is_retryable());
}

#[test]
fn test_duplicate_error() {
    let err = AdmissionError::DuplicateItem {
        name: "Kappa".to_string(),
    };
    assert_eq!(format!("{}", err), "item name \"Kappa\" already added");
}

#[test]
fn test_external_call_error() {
    let err = AdmissionError::ExternalCallFailed {
        phase: ExternalPhase::Evict,
        source: ExternalError::Request("503".to_string()),
    };
    assert_eq!(format!("{}", err), "evict failed: request failed: 503");
    assert!(err.is_retryable());
    assert!(!err.is_rejection());
}

#[test]
fn test_timeout_error() {
    let err = AdmissionError::Timeout {
        phase: ExternalPhase::Fetch,
    };
    assert_eq!(format!("{}", err), "fetch timed out");
}

#[test]
fn test_partial_commit_error() {
    let err = AdmissionError::PartialCommit {
        evicted: Item::new("old", "OldEmote"),
        source: Box::new(AdmissionError::Timeout {
            phase: ExternalPhase::Install,
        }),
    };
    assert_eq!(
        format!("{}", err),
        "removed old but install failed: install timed out"
    );
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("install timed out"));
}

#[test]
fn test_ledger_error_converts() {
    let err: AdmissionError = LedgerError::Backend("disk full".to_string()).into();
    assert_eq!(format!("{}", err), "ledger backend error: disk full");
    assert!(!err.is_retryable());
}

#[test]
fn test_capacity_exceeded_error() {
    let err = ExternalError::CapacityExceeded;
    assert_eq!(format!("{}", err), "pool capacity exceeded");
}
