use super::*;
use tokio::time::{Duration, timeout};

async fn recv_text(rx: &mut mpsc::Receiver<String>) -> String {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("receive timed out")
        .expect("channel closed")
}

async fn assert_channel_empty(rx: &mut mpsc::Receiver<String>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected channel to remain empty"
    );
}

#[test]
fn register_assigns_identity_from_palette() {
    let mut registry = SessionRegistry::new();
    let (tx, _rx) = mpsc::channel(8);

    let info = registry.register(tx);
    assert!(!info.id.is_empty());
    assert!(COLOR_PALETTE.contains(&info.color.as_str()));
    assert_eq!(info.name, "Guest 1");
    assert_eq!(registry.len(), 1);
}

#[test]
fn names_derive_from_member_count() {
    let mut registry = SessionRegistry::new();
    let (tx_a, _rx_a) = mpsc::channel(8);
    let (tx_b, _rx_b) = mpsc::channel(8);
    let (tx_c, _rx_c) = mpsc::channel(8);

    assert_eq!(registry.register(tx_a).name, "Guest 1");
    assert_eq!(registry.register(tx_b).name, "Guest 2");

    // After a departure the next name reuses the count, not a global counter.
    let first = registry.list()[0].id.clone();
    registry.unregister(&first);
    assert_eq!(registry.register(tx_c).name, "Guest 2");
}

#[test]
fn register_generates_distinct_ids() {
    let mut registry = SessionRegistry::new();
    let (tx_a, _rx_a) = mpsc::channel(8);
    let (tx_b, _rx_b) = mpsc::channel(8);

    let a = registry.register(tx_a);
    let b = registry.register(tx_b);
    assert_ne!(a.id, b.id);
}

#[test]
fn list_preserves_registration_order() {
    let mut registry = SessionRegistry::new();
    let mut ids = Vec::new();
    let mut guards = Vec::new();
    for _ in 0..4 {
        let (tx, rx) = mpsc::channel(8);
        guards.push(rx);
        ids.push(registry.register(tx).id);
    }

    let listed: Vec<String> = registry.list().into_iter().map(|m| m.id).collect();
    assert_eq!(listed, ids);
}

#[test]
fn unregister_absent_member_is_noop() {
    let mut registry = SessionRegistry::new();
    assert!(registry.unregister("nobody").is_none());

    let (tx, _rx) = mpsc::channel(8);
    let info = registry.register(tx);
    let removed = registry.unregister(&info.id).expect("member should exist");
    assert_eq!(removed.id, info.id);
    assert!(registry.is_empty());
    assert!(registry.unregister(&info.id).is_none(), "second remove is a no-op");
}

#[tokio::test]
async fn broadcast_reaches_all_except_excluded() {
    let mut registry = SessionRegistry::new();
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    let (tx_c, mut rx_c) = mpsc::channel(8);

    registry.register(tx_a);
    let b = registry.register(tx_b);
    registry.register(tx_c);

    registry.broadcast("hello", Some(&b.id));

    assert_eq!(recv_text(&mut rx_a).await, "hello");
    assert_eq!(recv_text(&mut rx_c).await, "hello");
    assert_channel_empty(&mut rx_b).await;
}

#[tokio::test]
async fn broadcast_without_exclusion_reaches_everyone() {
    let mut registry = SessionRegistry::new();
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    registry.register(tx_a);
    registry.register(tx_b);

    registry.broadcast("ping", None);
    assert_eq!(recv_text(&mut rx_a).await, "ping");
    assert_eq!(recv_text(&mut rx_b).await, "ping");
}

#[tokio::test]
async fn broadcast_skips_dead_and_full_channels() {
    let mut registry = SessionRegistry::new();

    // Dead: receiver dropped. Full: capacity-1 channel pre-filled.
    let (tx_dead, rx_dead) = mpsc::channel(8);
    let (tx_full, _rx_full) = mpsc::channel(1);
    let (tx_live, mut rx_live) = mpsc::channel(8);
    drop(rx_dead);
    tx_full.try_send("stuffed".to_owned()).expect("prefill");

    registry.register(tx_dead);
    registry.register(tx_full);
    registry.register(tx_live);

    // Must not panic or stop early; the live member still hears it.
    registry.broadcast("still here", None);
    assert_eq!(recv_text(&mut rx_live).await, "still here");
}

#[tokio::test]
async fn send_to_targets_a_single_member() {
    let mut registry = SessionRegistry::new();
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    let a = registry.register(tx_a);
    registry.register(tx_b);

    assert!(registry.send_to(&a.id, "just you"));
    assert!(!registry.send_to("nobody", "void"));

    assert_eq!(recv_text(&mut rx_a).await, "just you");
    assert_channel_empty(&mut rx_b).await;
}
