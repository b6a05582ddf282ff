//! Tests for utility functions

use prometheus_slot_rotation::util::{init_tracing_with, now_ms, ChangeKind, Item};

#[test]
fn test_change_kind_labels() {
    assert_eq!(ChangeKind::Add.to_string(), "add");
    assert_eq!(ChangeKind::RemovedPrevious.as_str(), "removed_previous");
    assert_eq!(
        serde_json::to_string(&ChangeKind::RemovedRandom).unwrap(),
        "\"removed_random\""
    );
}

#[test]
fn test_change_kind_removals() {
    assert!(!ChangeKind::Add.is_removal());
    assert!(ChangeKind::RemovedPrevious.is_removal());
    assert!(ChangeKind::RemovedRandom.is_removal());
    assert!(ChangeKind::RemovedBlocked.is_removal());
}

#[test]
fn test_item_new() {
    let item = Item::new("60ae958e", "Kappa");
    assert_eq!(item.id, "60ae958e");
    assert_eq!(item.name, "Kappa");
}

#[test]
fn test_now_ms_is_monotonic_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing_with("debug");
    init_tracing_with("info");
    tracing::info!("subscriber installed");
}
