//! Repository for the `oppgave_filer` table.

use hms_core::types::DbId;
use sqlx::PgPool;

use crate::models::fil::{CreateOppgaveFil, OppgaveFil};

const COLUMNS: &str = "id, bedrift_id, oppgave_id, object_key, file_name, content_type, \
    size_bytes, uploaded_by, created_at, updated_at";

/// Provides CRUD operations for task attachments.
pub struct FilRepo;

impl FilRepo {
    /// Record an uploaded attachment.
    pub async fn create(pool: &PgPool, input: &CreateOppgaveFil) -> Result<OppgaveFil, sqlx::Error> {
        let query = format!(
            "INSERT INTO oppgave_filer
                (bedrift_id, oppgave_id, object_key, file_name, content_type, size_bytes, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OppgaveFil>(&query)
            .bind(input.bedrift_id)
            .bind(input.oppgave_id)
            .bind(&input.object_key)
            .bind(&input.file_name)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<OppgaveFil>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM oppgave_filer WHERE id = $1 AND bedrift_id = $2");
        sqlx::query_as::<_, OppgaveFil>(&query)
            .bind(id)
            .bind(bedrift_id)
            .fetch_optional(pool)
            .await
    }

    /// List a task's attachments, oldest first.
    pub async fn list_for_oppgave(
        pool: &PgPool,
        bedrift_id: DbId,
        oppgave_id: DbId,
    ) -> Result<Vec<OppgaveFil>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM oppgave_filer
             WHERE oppgave_id = $1 AND bedrift_id = $2
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, OppgaveFil>(&query)
            .bind(oppgave_id)
            .bind(bedrift_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an attachment row, returning its object key for storage cleanup.
    pub async fn delete(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "DELETE FROM oppgave_filer WHERE id = $1 AND bedrift_id = $2 RETURNING object_key",
        )
        .bind(id)
        .bind(bedrift_id)
        .fetch_optional(pool)
        .await
    }
}
