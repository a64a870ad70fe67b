//! Repository for the `skjemaer` table and its per-company number series.

use hms_core::skjema;
use hms_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::TxError;
use crate::models::skjema::{CreateSkjema, Skjema, SkjemaFilter, UpdateSkjema};

const COLUMNS: &str = "id, bedrift_id, skjema_type, number, sequence, title, prosjekt_id, \
    status, severity, details, submitted_by, handled_by, handler_comment, closed_at, \
    created_at, updated_at";

/// Provides numbered inserts, workflow transitions and queries for forms.
pub struct SkjemaRepo;

impl SkjemaRepo {
    /// Insert a form with the next business number of its kind.
    ///
    /// The counter row is incremented in the same transaction as the insert,
    /// so concurrent submissions serialize on it and never share a number.
    /// A rolled-back insert also rolls back its number.
    pub async fn create(
        pool: &PgPool,
        bedrift_id: DbId,
        submitted_by: DbId,
        input: &CreateSkjema,
    ) -> Result<Skjema, TxError> {
        let mut tx = pool.begin().await?;

        let sequence = Self::next_sequence(&mut tx, bedrift_id, &input.skjema_type).await?;
        let number = skjema::format_number(&input.skjema_type, sequence)?;

        let query = format!(
            "INSERT INTO skjemaer
                (bedrift_id, skjema_type, number, sequence, title, prosjekt_id, severity,
                 details, submitted_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Skjema>(&query)
            .bind(bedrift_id)
            .bind(&input.skjema_type)
            .bind(&number)
            .bind(sequence)
            .bind(&input.title)
            .bind(input.prosjekt_id)
            .bind(&input.severity)
            .bind(&input.details)
            .bind(submitted_by)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Increment and return the company's counter for a form kind.
    async fn next_sequence(
        tx: &mut Transaction<'_, Postgres>,
        bedrift_id: DbId,
        skjema_type: &str,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO skjema_sekvenser (bedrift_id, skjema_type, last_value)
             VALUES ($1, $2, 1)
             ON CONFLICT (bedrift_id, skjema_type)
             DO UPDATE SET last_value = skjema_sekvenser.last_value + 1
             RETURNING last_value",
        )
        .bind(bedrift_id)
        .bind(skjema_type)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<Skjema>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skjemaer WHERE id = $1 AND bedrift_id = $2");
        sqlx::query_as::<_, Skjema>(&query)
            .bind(id)
            .bind(bedrift_id)
            .fetch_optional(pool)
            .await
    }

    /// List a company's forms, newest first.
    pub async fn list(
        pool: &PgPool,
        bedrift_id: DbId,
        filter: &SkjemaFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Skjema>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM skjemaer
             WHERE bedrift_id = $1
               AND ($2::TEXT IS NULL OR skjema_type = $2)
               AND ($3::TEXT IS NULL OR status = $3)
               AND ($4::BIGINT IS NULL OR prosjekt_id = $4)
               AND ($5::BIGINT IS NULL OR submitted_by = $5)
             ORDER BY created_at DESC, id DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Skjema>(&query)
            .bind(bedrift_id)
            .bind(&filter.skjema_type)
            .bind(&filter.status)
            .bind(filter.prosjekt_id)
            .bind(filter.submitted_by)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update editable fields. Only non-`None` fields in `input` are applied.
    ///
    /// The row is only written while its status is still `expected_status`;
    /// `None` means the form is gone or has moved on in the workflow.
    pub async fn update(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        expected_status: &str,
        input: &UpdateSkjema,
    ) -> Result<Option<Skjema>, sqlx::Error> {
        let query = format!(
            "UPDATE skjemaer SET
                title = COALESCE($3, title),
                severity = COALESCE($4, severity),
                details = COALESCE($5, details),
                prosjekt_id = COALESCE($6, prosjekt_id)
             WHERE id = $1 AND bedrift_id = $2 AND status = $7
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Skjema>(&query)
            .bind(id)
            .bind(bedrift_id)
            .bind(&input.title)
            .bind(&input.severity)
            .bind(&input.details)
            .bind(input.prosjekt_id)
            .bind(expected_status)
            .fetch_optional(pool)
            .await
    }

    /// Move a form to `new_status`, validating the transition against the
    /// current status under a row lock.
    ///
    /// Records the handler and comment; `closed_at` is set when closing and
    /// cleared when re-opening. Returns `None` if the form does not exist.
    pub async fn change_status(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        new_status: &str,
        handled_by: DbId,
        comment: Option<&str>,
    ) -> Result<Option<Skjema>, TxError> {
        let mut tx = pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            "SELECT status FROM skjemaer WHERE id = $1 AND bedrift_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(bedrift_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        skjema::validate_transition(&current, new_status)?;

        let query = format!(
            "UPDATE skjemaer SET
                status = $2,
                handled_by = $3,
                handler_comment = COALESCE($4, handler_comment),
                closed_at = CASE WHEN $2 = '{closed}' THEN NOW() ELSE NULL END
             WHERE id = $1
             RETURNING {COLUMNS}",
            closed = skjema::STATUS_LUKKET,
        );
        let row = sqlx::query_as::<_, Skjema>(&query)
            .bind(id)
            .bind(new_status)
            .bind(handled_by)
            .bind(comment)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Delete a form. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, bedrift_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM skjemaer WHERE id = $1 AND bedrift_id = $2")
            .bind(id)
            .bind(bedrift_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

