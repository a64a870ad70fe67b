//! Repository for the `support_logg` table.

use hms_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::support_logg::{CreateSupportLogg, SupportLogg};

const SELECT: &str = "SELECT l.id, l.bedrift_id, b.name AS bedrift_name, l.user_id,
        u.first_name || ' ' || u.last_name AS user_name,
        l.action, l.description, l.metadata, l.created_at
    FROM support_logg l
    JOIN bedrifter b ON b.id = l.bedrift_id
    LEFT JOIN users u ON u.id = l.user_id";

/// Provides insert and listing for support staff's interaction log.
pub struct SupportLoggRepo;

impl SupportLoggRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateSupportLogg,
    ) -> Result<SupportLogg, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let entry = Self::create_in_tx(&mut tx, user_id, input).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Insert a log entry inside an existing transaction, so it commits or
    /// rolls back with the change it records.
    pub(crate) async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        input: &CreateSupportLogg,
    ) -> Result<SupportLogg, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO support_logg (bedrift_id, user_id, action, description, metadata)
             VALUES ($1, $2, $3, $4, COALESCE($5, '{}'::jsonb))
             RETURNING id",
        )
        .bind(input.bedrift_id)
        .bind(user_id)
        .bind(&input.action)
        .bind(&input.description)
        .bind(&input.metadata)
        .fetch_one(&mut **tx)
        .await?;

        let query = format!("{SELECT} WHERE l.id = $1");
        sqlx::query_as::<_, SupportLogg>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Newest entries first, optionally for one company.
    pub async fn list(
        pool: &PgPool,
        bedrift_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SupportLogg>, sqlx::Error> {
        let query = format!(
            "{SELECT}
             WHERE ($1::BIGINT IS NULL OR l.bedrift_id = $1)
             ORDER BY l.created_at DESC, l.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, SupportLogg>(&query)
            .bind(bedrift_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
