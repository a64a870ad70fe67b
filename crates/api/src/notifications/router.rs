//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] subscribes to the platform event bus and turns the
//! events users care about into notification rows plus a live WebSocket push.

use std::sync::Arc;

use axum::extract::ws::Message;
use hms_core::events::{
    notification_link, notification_message, EVENT_LAGER_LOW_STOCK, EVENT_OPPGAVE_ASSIGNED,
    EVENT_SKJEMA_STATUS_CHANGED, EVENT_SKJEMA_SUBMITTED,
};
use hms_core::roles::{ROLE_ADMIN, ROLE_LEDER};
use hms_core::types::DbId;
use hms_db::models::notification::CreateNotification;
use hms_db::repositories::{NotificationRepo, UserRepo};
use hms_db::DbPool;
use hms_events::PlatformEvent;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes platform events to user notifications.
pub struct NotificationRouter {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    /// Create a new router with the given database pool and WebSocket manager.
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](hms_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event to all affected users.
    ///
    /// Returns the ids of the created notifications.
    pub async fn route_event(&self, event: &PlatformEvent) -> Result<Vec<DbId>, sqlx::Error> {
        let Some(bedrift_id) = event.bedrift_id else {
            return Ok(vec![]);
        };
        let Some(message) = notification_message(&event.event_type, &event.payload) else {
            return Ok(vec![]);
        };
        let link = notification_link(
            event.source_entity_type.as_deref(),
            event.source_entity_id,
        );

        let mut created = Vec::new();
        for user_id in self.determine_targets(bedrift_id, event).await? {
            // Nobody is notified about their own action.
            if event.actor_user_id == Some(user_id) {
                continue;
            }

            let notification = NotificationRepo::create(
                &self.pool,
                &CreateNotification {
                    user_id,
                    bedrift_id,
                    event_type: event.event_type.clone(),
                    message: message.clone(),
                    link: link.clone(),
                },
            )
            .await?;

            let msg = serde_json::json!({
                "type": "notification",
                "notification": notification,
            });
            let delivered = self
                .ws_manager
                .send_to_user(user_id, Message::Text(msg.to_string().into()))
                .await;
            tracing::debug!(user_id, delivered, event_type = %event.event_type, "Notification routed");

            created.push(notification.id);
        }

        Ok(created)
    }

    /// Determine which users should receive a notification for the event.
    async fn determine_targets(
        &self,
        bedrift_id: DbId,
        event: &PlatformEvent,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let payload_user = |key: &str| event.payload.get(key).and_then(Value::as_i64);

        let candidates = match event.event_type.as_str() {
            EVENT_OPPGAVE_ASSIGNED => payload_user("assigned_user_id").into_iter().collect(),
            EVENT_SKJEMA_STATUS_CHANGED => payload_user("submitted_by").into_iter().collect(),
            EVENT_SKJEMA_SUBMITTED | EVENT_LAGER_LOW_STOCK => {
                return UserRepo::list_ids_with_roles(&self.pool, bedrift_id, &[ROLE_LEDER, ROLE_ADMIN])
                    .await;
            }
            _ => vec![],
        };

        // Payload ids are only trusted when they belong to the same company.
        let mut targets = Vec::with_capacity(candidates.len());
        for user_id in candidates {
            if UserRepo::is_active_member(&self.pool, bedrift_id, user_id).await? {
                targets.push(user_id);
            }
        }
        Ok(targets)
    }
}
