//! Repository for the `prosjekter` table, including the project cascade
//! delete.

use hms_core::types::DbId;
use sqlx::PgPool;

use crate::models::prosjekt::{
    CreateProsjekt, Prosjekt, ProsjektDeleteSummary, StatusCount, UpdateProsjekt,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, bedrift_id, name, description, status, customer, address, \
    start_date, end_date, created_by, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProsjektRepo;

impl ProsjektRepo {
    /// Insert a new project, returning the created row.
    ///
    /// If `status` is `None` in the input, defaults to `planlagt`.
    pub async fn create(
        pool: &PgPool,
        bedrift_id: DbId,
        created_by: DbId,
        input: &CreateProsjekt,
    ) -> Result<Prosjekt, sqlx::Error> {
        let query = format!(
            "INSERT INTO prosjekter
                (bedrift_id, name, description, status, customer, address, start_date, end_date, created_by)
             VALUES ($1, $2, $3, COALESCE($4, 'planlagt'), $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prosjekt>(&query)
            .bind(bedrift_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.customer)
            .bind(&input.address)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a project of a company by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<Prosjekt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prosjekter WHERE id = $1 AND bedrift_id = $2");
        sqlx::query_as::<_, Prosjekt>(&query)
            .bind(id)
            .bind(bedrift_id)
            .fetch_optional(pool)
            .await
    }

    /// List a company's projects, optionally filtered by status, newest first.
    pub async fn list(
        pool: &PgPool,
        bedrift_id: DbId,
        status: Option<&str>,
    ) -> Result<Vec<Prosjekt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prosjekter
             WHERE bedrift_id = $1 AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Prosjekt>(&query)
            .bind(bedrift_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists in the company.
    pub async fn update(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        input: &UpdateProsjekt,
    ) -> Result<Option<Prosjekt>, sqlx::Error> {
        let query = format!(
            "UPDATE prosjekter SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                customer = COALESCE($6, customer),
                address = COALESCE($7, address),
                start_date = COALESCE($8, start_date),
                end_date = COALESCE($9, end_date)
             WHERE id = $1 AND bedrift_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prosjekt>(&query)
            .bind(id)
            .bind(bedrift_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.customer)
            .bind(&input.address)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Task counts per status for one project.
    pub async fn task_counts(
        pool: &PgPool,
        prosjekt_id: DbId,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM oppgaver
             WHERE prosjekt_id = $1
             GROUP BY status
             ORDER BY status",
        )
        .bind(prosjekt_id)
        .fetch_all(pool)
        .await
    }

    /// Total hours logged against one project.
    pub async fn total_hours(pool: &PgPool, prosjekt_id: DbId) -> Result<f64, sqlx::Error> {
        let total: Option<f64> =
            sqlx::query_scalar("SELECT SUM(hours) FROM time_entries WHERE prosjekt_id = $1")
                .bind(prosjekt_id)
                .fetch_one(pool)
                .await?;
        Ok(total.unwrap_or(0.0))
    }

    /// Delete a project and everything hanging off it in one transaction.
    ///
    /// Order matters because foreign keys restrict deletes:
    /// attachments, time entries, detach forms and stock movements, tasks,
    /// then the project. Returns `None` (and changes nothing) if the project
    /// does not exist in the company. The returned `file_keys` must be
    /// removed from object storage by the caller after commit.
    pub async fn delete_cascade(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<ProsjektDeleteSummary>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM prosjekter WHERE id = $1 AND bedrift_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(bedrift_id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let file_keys: Vec<String> = sqlx::query_scalar(
            "DELETE FROM oppgave_filer
             WHERE oppgave_id IN (SELECT id FROM oppgaver WHERE prosjekt_id = $1)
             RETURNING object_key",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let time_entries = sqlx::query("DELETE FROM time_entries WHERE prosjekt_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("UPDATE skjemaer SET prosjekt_id = NULL WHERE prosjekt_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE lager_bevegelser SET prosjekt_id = NULL WHERE prosjekt_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let tasks = sqlx::query("DELETE FROM oppgaver WHERE prosjekt_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM prosjekter WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(ProsjektDeleteSummary {
            deleted_tasks: tasks,
            deleted_time_entries: time_entries,
            deleted_files: file_keys.len() as u64,
            file_keys,
        }))
    }
}
