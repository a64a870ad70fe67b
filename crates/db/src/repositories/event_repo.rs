//! Repository for the `events` table.

use hms_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{ActivityEntry, CreateEvent};

/// Provides insert and activity-feed queries for platform events.
pub struct EventRepo;

impl EventRepo {
    /// Persist an event, returning its generated ID.
    pub async fn insert(pool: &PgPool, input: &CreateEvent) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events
                (bedrift_id, event_type, source_entity_type, source_entity_id, actor_user_id, payload)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(input.bedrift_id)
        .bind(&input.event_type)
        .bind(&input.source_entity_type)
        .bind(input.source_entity_id)
        .bind(input.actor_user_id)
        .bind(&input.payload)
        .fetch_one(pool)
        .await
    }

    /// A company's recent events, newest first.
    pub async fn list_for_bedrift(
        pool: &PgPool,
        bedrift_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityEntry>, sqlx::Error> {
        sqlx::query_as::<_, ActivityEntry>(
            "SELECT e.id, e.event_type, e.source_entity_type, e.source_entity_id,
                    e.actor_user_id, u.first_name || ' ' || u.last_name AS actor_name,
                    e.payload, e.created_at
             FROM events e
             LEFT JOIN users u ON u.id = e.actor_user_id
             WHERE e.bedrift_id = $1
             ORDER BY e.created_at DESC, e.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(bedrift_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
