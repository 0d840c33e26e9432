//! Tests for `WsManager` connection tracking and notification pushes.

use axum::extract::ws::Message;
use roster_api::ws::WsManager;
use roster_events::BroadcastSink;

fn text(msg: Message) -> serde_json::Value {
    match msg {
        Message::Text(t) => serde_json::from_str(t.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: add/remove tracks the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_connections() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string(), Some(1)).await;
    let _rx2 = manager.add("conn-2".to_string(), None).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 1);
    assert_eq!(manager.push(1, serde_json::json!({})).await, 0);
}

// ---------------------------------------------------------------------------
// Test: push addresses only the notifiable's sockets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn push_reaches_every_socket_of_the_notifiable() {
    let manager = WsManager::new();
    let mut tab_a = manager.add("tab-a".to_string(), Some(42)).await;
    let mut tab_b = manager.add("tab-b".to_string(), Some(42)).await;
    let mut stranger = manager.add("other".to_string(), Some(7)).await;
    let mut anonymous = manager.add("anon".to_string(), None).await;

    let reached = manager
        .push(42, serde_json::json!({ "message": "hello" }))
        .await;
    assert_eq!(reached, 2);

    for rx in [&mut tab_a, &mut tab_b] {
        let frame = text(rx.recv().await.expect("push expected"));
        assert_eq!(
            frame,
            serde_json::json!({
                "type": "notification",
                "channel": "users.42",
                "data": { "message": "hello" },
            })
        );
    }
    assert!(stranger.try_recv().is_err());
    assert!(anonymous.try_recv().is_err());
}

#[tokio::test]
async fn push_without_listeners_reaches_nobody() {
    let manager = WsManager::new();
    assert_eq!(manager.push(42, serde_json::json!({})).await, 0);
}

#[tokio::test]
async fn push_skips_closed_channels() {
    let manager = WsManager::new();
    let closed = manager.add("conn-1".to_string(), Some(42)).await;
    let mut open = manager.add("conn-2".to_string(), Some(42)).await;
    drop(closed);

    assert_eq!(manager.push(42, serde_json::json!({ "n": 1 })).await, 1);
    assert_eq!(text(open.recv().await.unwrap())["data"]["n"], 1);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some(3)).await;

    manager.shutdown_all().await;
    assert_eq!(manager.connection_count().await, 0);

    assert!(matches!(rx1.recv().await, Some(Message::Close(None))));
    assert!(matches!(rx2.recv().await, Some(Message::Close(None))));
    assert!(rx1.recv().await.is_none(), "channel should be closed");
}

// ---------------------------------------------------------------------------
// Test: ping_all() pings every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_pings_everyone() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), Some(5)).await;

    manager.ping_all().await;

    assert!(matches!(rx1.recv().await, Some(Message::Ping(_))));
    assert!(matches!(rx2.recv().await, Some(Message::Ping(_))));
}

// ---------------------------------------------------------------------------
// Test: adding with a duplicate ID replaces the previous connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_id_replaces_previous_connection() {
    let manager = WsManager::new();
    let _rx_old = manager.add("conn-1".to_string(), Some(1)).await;
    let mut rx_new = manager.add("conn-1".to_string(), Some(2)).await;
    assert_eq!(manager.connection_count().await, 1);

    assert_eq!(manager.push(1, serde_json::json!({})).await, 0);
    assert_eq!(manager.push(2, serde_json::json!({})).await, 1);
    assert!(rx_new.recv().await.is_some());
}
