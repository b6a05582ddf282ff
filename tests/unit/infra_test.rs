//! Tests for the in-memory ledger, notifier and resource adapters

use prometheus_slot_rotation::core::{
    build_entry, ExternalError, ExternalPhase, Ledger, Notifier, RequestRef, ResourceClient,
};
use prometheus_slot_rotation::infra::{InMemoryLedger, InMemoryNotifier, InMemoryResourceClient};
use prometheus_slot_rotation::util::{ChangeKind, Item};

#[test]
fn test_entries_keep_insertion_order() {
    let ledger = InMemoryLedger::new();
    ledger.append(build_entry("t", "a", ChangeKind::Add, false)).unwrap();
    ledger
        .append(build_entry("t", "a", ChangeKind::RemovedRandom, true))
        .unwrap();

    let entries = ledger.entries("t");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].change, ChangeKind::Add);
    assert!(entries[1].blocked);
    assert_ne!(entries[0].id, entries[1].id);
}

#[test]
fn test_recent_adds_zero_limit_is_empty() {
    let ledger = InMemoryLedger::new();
    ledger.append(build_entry("t", "a", ChangeKind::Add, false)).unwrap();
    assert!(ledger.recent_adds("t", 0).unwrap().is_empty());
}

#[tokio::test]
async fn test_notifier_records_messages_and_statuses() {
    let notifier = InMemoryNotifier::new();
    notifier.report("chan", "first").await.unwrap();
    notifier.report("chan", "second").await.unwrap();

    let request = RequestRef {
        tenant: "t".to_string(),
        reward_id: "r".to_string(),
        redemption_id: "x".to_string(),
    };
    notifier.set_upstream_status(&request, true).await.unwrap();

    let messages = notifier.messages("chan", 10);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "first");
    assert_eq!(notifier.last_message("chan").as_deref(), Some("second"));
    assert!(notifier.last_message("other").is_none());
    assert_eq!(notifier.statuses(), vec![(request, true)]);
}

#[tokio::test]
async fn test_resource_client_rejects_reinstall_and_missing_evict() {
    let client = InMemoryResourceClient::new();
    client.set_pool("t", 3, vec![Item::new("a", "A")]);

    let err = client.install("t", "a").await.unwrap_err();
    assert!(matches!(err, ExternalError::Request(_)));

    let err = client.evict("t", "b").await.unwrap_err();
    assert!(matches!(err, ExternalError::NotFound(_)));
    assert_eq!(client.pool_items("t").len(), 1);
}

#[tokio::test]
async fn test_resource_client_fault_injection_is_one_shot() {
    let client = InMemoryResourceClient::new();
    client.set_pool("t", 2, vec![]);
    client.fail_next(ExternalPhase::Fetch, ExternalError::Request("down".to_string()));

    assert!(client.fetch_pool("t").await.is_err());
    let snapshot = client.fetch_pool("t").await.unwrap();
    assert_eq!(snapshot.capacity, 2);
    assert_eq!(client.calls(ExternalPhase::Fetch), 2);
}
