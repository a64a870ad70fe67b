//! Repository for the `oppgaver` table.

use hms_core::types::DbId;
use sqlx::PgPool;

use crate::models::oppgave::{CreateOppgave, Oppgave, OppgaveDeleteSummary, UpdateOppgave};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, bedrift_id, prosjekt_id, title, description, status, priority, \
    position, due_date, estimated_hours, assigned_user_id, created_by, created_at, updated_at";

/// Kanban column order.
const STATUS_ORDER: &str = "CASE status
    WHEN 'ikke_startet' THEN 1
    WHEN 'pagar' THEN 2
    WHEN 'til_godkjenning' THEN 3
    WHEN 'fullfort' THEN 4
    ELSE 5 END";

/// Provides CRUD operations for tasks.
pub struct OppgaveRepo;

impl OppgaveRepo {
    /// Insert a new task into a project, returning the created row.
    ///
    /// Without an explicit `position` the task goes to the end of its column.
    pub async fn create(
        pool: &PgPool,
        bedrift_id: DbId,
        prosjekt_id: DbId,
        created_by: DbId,
        input: &CreateOppgave,
    ) -> Result<Oppgave, sqlx::Error> {
        let query = format!(
            "INSERT INTO oppgaver
                (bedrift_id, prosjekt_id, title, description, status, priority, position,
                 due_date, estimated_hours, assigned_user_id, created_by)
             VALUES (
                $1, $2, $3, $4, COALESCE($5, 'ikke_startet'), COALESCE($6, 'middels'),
                COALESCE($7, (
                    SELECT COALESCE(MAX(position), -1) + 1 FROM oppgaver
                    WHERE prosjekt_id = $2 AND status = COALESCE($5, 'ikke_startet')
                )),
                $8, $9, $10, $11
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oppgave>(&query)
            .bind(bedrift_id)
            .bind(prosjekt_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.position)
            .bind(input.due_date)
            .bind(input.estimated_hours)
            .bind(input.assigned_user_id)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a task of a company by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<Oppgave>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM oppgaver WHERE id = $1 AND bedrift_id = $2");
        sqlx::query_as::<_, Oppgave>(&query)
            .bind(id)
            .bind(bedrift_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's tasks ordered by Kanban column, then position.
    pub async fn list_for_prosjekt(
        pool: &PgPool,
        bedrift_id: DbId,
        prosjekt_id: DbId,
    ) -> Result<Vec<Oppgave>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM oppgaver
             WHERE prosjekt_id = $1 AND bedrift_id = $2
             ORDER BY {STATUS_ORDER}, position, id"
        );
        sqlx::query_as::<_, Oppgave>(&query)
            .bind(prosjekt_id)
            .bind(bedrift_id)
            .fetch_all(pool)
            .await
    }

    /// Open (not `fullfort`) tasks assigned to a user, soonest due first.
    pub async fn list_open_for_user(
        pool: &PgPool,
        bedrift_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<Oppgave>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM oppgaver
             WHERE assigned_user_id = $1 AND bedrift_id = $2 AND status <> 'fullfort'
             ORDER BY due_date ASC NULLS LAST, id"
        );
        sqlx::query_as::<_, Oppgave>(&query)
            .bind(user_id)
            .bind(bedrift_id)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Only non-`None` fields in `input` are applied;
    /// `unassign` clears the assignee.
    pub async fn update(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        input: &UpdateOppgave,
    ) -> Result<Option<Oppgave>, sqlx::Error> {
        let query = format!(
            "UPDATE oppgaver SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                position = COALESCE($7, position),
                due_date = COALESCE($8, due_date),
                estimated_hours = COALESCE($9, estimated_hours),
                assigned_user_id = CASE WHEN $11 THEN NULL
                                        ELSE COALESCE($10, assigned_user_id) END
             WHERE id = $1 AND bedrift_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oppgave>(&query)
            .bind(id)
            .bind(bedrift_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.position)
            .bind(input.due_date)
            .bind(input.estimated_hours)
            .bind(input.assigned_user_id)
            .bind(input.unassign)
            .fetch_optional(pool)
            .await
    }

    /// Move a task to another Kanban column (and optionally position).
    pub async fn update_status(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        status: &str,
        position: Option<i32>,
    ) -> Result<Option<Oppgave>, sqlx::Error> {
        let query = format!(
            "UPDATE oppgaver SET
                status = $3,
                position = COALESCE($4, position)
             WHERE id = $1 AND bedrift_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oppgave>(&query)
            .bind(id)
            .bind(bedrift_id)
            .bind(status)
            .bind(position)
            .fetch_optional(pool)
            .await
    }

    /// Delete a task: its attachments are deleted and its time entries are
    /// detached (the hours stay on the project), all in one transaction.
    ///
    /// Returns `None` if the task does not exist in the company.
    pub async fn delete_cascade(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<OppgaveDeleteSummary>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM oppgaver WHERE id = $1 AND bedrift_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(bedrift_id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let file_keys: Vec<String> =
            sqlx::query_scalar("DELETE FROM oppgave_filer WHERE oppgave_id = $1 RETURNING object_key")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let detached = sqlx::query("UPDATE time_entries SET oppgave_id = NULL WHERE oppgave_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM oppgaver WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(OppgaveDeleteSummary {
            deleted_files: file_keys.len() as u64,
            detached_time_entries: detached,
            file_keys,
        }))
    }
}
