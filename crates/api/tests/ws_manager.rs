//! Unit tests for `WsManager`.
//!
//! The socket registry is exercised directly, without HTTP upgrades.

use axum::extract::ws::Message;
use hms_api::ws::WsManager;
use uuid::Uuid;

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let tab = Uuid::new_v4();
    let _rx = manager.add(7, tab).await;
    assert_eq!(manager.connection_count().await, 1);

    // Wrong owner or unknown socket: nothing to remove.
    manager.remove(8, tab).await;
    manager.remove(7, Uuid::new_v4()).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove(7, tab).await;
    assert_eq!(manager.connection_count().await, 0);
    assert_eq!(manager.send_to_user(7, Message::Text("x".into())).await, 0);
}

#[tokio::test]
async fn send_to_user_reaches_every_tab_of_that_user_only() {
    let manager = WsManager::new();

    let mut tab1 = manager.add(7, Uuid::new_v4()).await;
    let mut tab2 = manager.add(7, Uuid::new_v4()).await;
    let mut other = manager.add(8, Uuid::new_v4()).await;

    let delivered = manager.send_to_user(7, Message::Text("hei".into())).await;
    assert_eq!(delivered, 2);

    assert!(matches!(tab1.recv().await, Some(Message::Text(t)) if t.as_str() == "hei"));
    assert!(matches!(tab2.recv().await, Some(Message::Text(t)) if t.as_str() == "hei"));
    assert!(other.try_recv().is_err());
}

#[tokio::test]
async fn send_to_user_skips_closed_channels() {
    let manager = WsManager::new();

    let rx = manager.add(7, Uuid::new_v4()).await;
    drop(rx);

    let delivered = manager.send_to_user(7, Message::Text("x".into())).await;
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn ping_all_pings_live_sockets_and_prunes_dead_ones() {
    let manager = WsManager::new();

    let mut live = manager.add(1, Uuid::new_v4()).await;
    let dead = manager.add(1, Uuid::new_v4()).await;
    let gone = manager.add(2, Uuid::new_v4()).await;
    drop(dead);
    drop(gone);

    assert_eq!(manager.ping_all().await, 1);
    assert_eq!(manager.connection_count().await, 1);
    assert!(matches!(live.recv().await, Some(Message::Ping(_))));
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add(1, Uuid::new_v4()).await;
    let mut rx2 = manager.add(2, Uuid::new_v4()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx1.recv().await, Some(Message::Close(None))));
    assert!(matches!(rx2.recv().await, Some(Message::Close(None))));
}
