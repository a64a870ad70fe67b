use std::sync::Arc;

use hms_events::{EmailDelivery, EventBus, PlatformEvent};
use hms_storage::ObjectStore;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hms_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Storage for task attachments and safety data sheets.
    pub object_store: Arc<dyn ObjectStore>,
    /// SMTP mailer; `None` when email is not configured.
    pub mailer: Option<Arc<EmailDelivery>>,
}

impl AppState {
    /// Publish a platform event on the bus.
    pub fn publish(&self, event: PlatformEvent) {
        self.event_bus.publish(event);
    }

    /// Remove stored objects after their rows are gone. Failures are logged
    /// and otherwise ignored; the rows are already committed.
    pub async fn remove_objects(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.object_store.delete(key).await {
                tracing::warn!(error = %e, key = %key, "Failed to delete stored object");
            }
        }
    }
}
