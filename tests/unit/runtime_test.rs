//! Tests for runtime adapters and inbound models

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use prometheus_slot_rotation::core::RequestRef;
use prometheus_slot_rotation::runtime::{ItemLinkPattern, RedemptionEvent, Spawn, TokioSpawner};

#[tokio::test]
async fn test_tokio_spawner_runs_detached() {
    let spawner = TokioSpawner::current().unwrap();
    let ran = Arc::new(AtomicBool::new(false));
    let (tx, rx) = tokio::sync::oneshot::channel();

    let flag = Arc::clone(&ran);
    spawner.spawn(async move {
        flag.store(true, Ordering::SeqCst);
        let _ = tx.send(());
    });

    rx.await.unwrap();
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn test_tokio_spawner_outside_runtime() {
    assert!(TokioSpawner::current().is_err());
}

#[test]
fn test_redemption_event_defaults() {
    let json = r#"{
        "request": { "tenant": "t", "reward_id": "r", "redemption_id": "x" },
        "channel": "chan",
        "user_id": "1",
        "user_name": "viewer",
        "user_input": "https://7tv.app/emotes/abc"
    }"#;
    let event: RedemptionEvent = serde_json::from_str(json).unwrap();
    assert!(event.update_status);
    assert_eq!(event.slots, None);
    assert_eq!(event.tenant(), "t");
    assert_eq!(
        event.request,
        RequestRef {
            tenant: "t".to_string(),
            reward_id: "r".to_string(),
            redemption_id: "x".to_string(),
        }
    );
}

#[test]
fn test_item_link_pattern_custom_prefix() {
    let links = ItemLinkPattern::new("example.org/items/").unwrap();
    assert_eq!(links.parse("see https://example.org/items/xyz9").unwrap(), "xyz9");
    assert!(links.parse("https://7tv.app/emotes/abc").is_err());
}

#[test]
fn test_item_link_pattern_escapes_prefix_metacharacters() {
    let links = ItemLinkPattern::new("host/a+b(1)/").unwrap();
    assert_eq!(links.parse("http://host/a+b(1)/id_7").unwrap(), "id_7");
    assert!(links.parse("http://host/aab1/id_7").is_err());
}
