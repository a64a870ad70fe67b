//! Repository for the `time_entries` table.

use hms_core::time_entry;
use hms_core::types::{Date, DbId};
use sqlx::{PgConnection, PgPool};

use crate::error::TxError;
use crate::models::time_entry::{
    CreateTimeEntry, TimeEntry, TimeEntryChanges, TimeEntryExportRow, TimeEntryFilter,
    TimeSummaryRow,
};

const COLUMNS: &str = "id, bedrift_id, user_id, prosjekt_id, oppgave_id, work_date, hours, \
    description, created_at, updated_at";

/// Shared WHERE clause for filtered queries over `time_entries t`.
const FILTER: &str = "t.bedrift_id = $1
    AND t.work_date BETWEEN $2 AND $3
    AND ($4::BIGINT IS NULL OR t.user_id = $4)
    AND ($5::BIGINT IS NULL OR t.prosjekt_id = $5)";

/// Provides CRUD, reporting and export queries for time entries.
pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Log hours for `user_id`.
    ///
    /// The user's row is locked while the day's total is checked, so
    /// concurrent entries cannot push the day past the cap.
    pub async fn create(
        pool: &PgPool,
        bedrift_id: DbId,
        user_id: DbId,
        input: &CreateTimeEntry,
    ) -> Result<TimeEntry, TxError> {
        let mut tx = pool.begin().await?;

        lock_user(&mut tx, user_id).await?;
        let already = hours_on_date(&mut tx, user_id, input.work_date, None).await?;
        time_entry::validate_daily_total(already, input.hours)?;

        let query = format!(
            "INSERT INTO time_entries
                (bedrift_id, user_id, prosjekt_id, oppgave_id, work_date, hours, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(bedrift_id)
            .bind(user_id)
            .bind(input.prosjekt_id)
            .bind(input.oppgave_id)
            .bind(input.work_date)
            .bind(input.hours)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM time_entries WHERE id = $1 AND bedrift_id = $2");
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .bind(bedrift_id)
            .fetch_optional(pool)
            .await
    }

    /// Entries within the filter's period, newest date first.
    pub async fn list(
        pool: &PgPool,
        bedrift_id: DbId,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries t
             WHERE {FILTER}
             ORDER BY t.work_date DESC, t.id DESC"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(bedrift_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.user_id)
            .bind(filter.prosjekt_id)
            .fetch_all(pool)
            .await
    }

    /// Total hours a user logged in `[from, to]`.
    pub async fn hours_in_period(
        pool: &PgPool,
        user_id: DbId,
        from: Date,
        to: Date,
    ) -> Result<f64, sqlx::Error> {
        let total: Option<f64> = sqlx::query_scalar(
            "SELECT SUM(hours) FROM time_entries
             WHERE user_id = $1 AND work_date BETWEEN $2 AND $3",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;
        Ok(total.unwrap_or(0.0))
    }

    /// Overwrite an entry owned by `user_id` with the merged values, under
    /// the same per-user lock and daily cap as [`TimeEntryRepo::create`].
    ///
    /// Returns `None` if the entry does not exist in the company.
    pub async fn update(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        user_id: DbId,
        changes: &TimeEntryChanges,
    ) -> Result<Option<TimeEntry>, TxError> {
        let mut tx = pool.begin().await?;

        lock_user(&mut tx, user_id).await?;
        let already = hours_on_date(&mut tx, user_id, changes.work_date, Some(id)).await?;
        time_entry::validate_daily_total(already, changes.hours)?;

        let query = format!(
            "UPDATE time_entries SET
                prosjekt_id = $3,
                oppgave_id = $4,
                work_date = $5,
                hours = $6,
                description = $7
             WHERE id = $1 AND bedrift_id = $2
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .bind(bedrift_id)
            .bind(changes.prosjekt_id)
            .bind(changes.oppgave_id)
            .bind(changes.work_date)
            .bind(changes.hours)
            .bind(&changes.description)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Delete an entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, bedrift_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = $1 AND bedrift_id = $2")
            .bind(id)
            .bind(bedrift_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hours grouped by project and employee within the period.
    pub async fn summary(
        pool: &PgPool,
        bedrift_id: DbId,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeSummaryRow>, sqlx::Error> {
        let query = format!(
            "SELECT t.prosjekt_id, p.name AS prosjekt_name, t.user_id,
                    u.first_name || ' ' || u.last_name AS employee,
                    SUM(t.hours) AS hours
             FROM time_entries t
             JOIN prosjekter p ON p.id = t.prosjekt_id
             JOIN users u ON u.id = t.user_id
             WHERE {FILTER}
             GROUP BY t.prosjekt_id, p.name, t.user_id, u.first_name, u.last_name
             ORDER BY p.name, employee"
        );
        sqlx::query_as::<_, TimeSummaryRow>(&query)
            .bind(bedrift_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.user_id)
            .bind(filter.prosjekt_id)
            .fetch_all(pool)
            .await
    }

    /// Flattened rows for the CSV export, oldest first.
    pub async fn export_rows(
        pool: &PgPool,
        bedrift_id: DbId,
        filter: &TimeEntryFilter,
    ) -> Result<Vec<TimeEntryExportRow>, sqlx::Error> {
        let query = format!(
            "SELECT t.work_date,
                    u.first_name || ' ' || u.last_name AS employee,
                    p.name AS project,
                    o.title AS task,
                    t.hours,
                    t.description
             FROM time_entries t
             JOIN users u ON u.id = t.user_id
             JOIN prosjekter p ON p.id = t.prosjekt_id
             LEFT JOIN oppgaver o ON o.id = t.oppgave_id
             WHERE {FILTER}
             ORDER BY t.work_date, employee, t.id"
        );
        sqlx::query_as::<_, TimeEntryExportRow>(&query)
            .bind(bedrift_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.user_id)
            .bind(filter.prosjekt_id)
            .fetch_all(pool)
            .await
    }
}

async fn lock_user(conn: &mut PgConnection, user_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Hours a user already has on a date, optionally ignoring the entry being
/// edited.
async fn hours_on_date(
    conn: &mut PgConnection,
    user_id: DbId,
    work_date: Date,
    exclude_id: Option<DbId>,
) -> Result<f64, sqlx::Error> {
    let total: Option<f64> = sqlx::query_scalar(
        "SELECT SUM(hours) FROM time_entries
         WHERE user_id = $1 AND work_date = $2 AND ($3::BIGINT IS NULL OR id <> $3)",
    )
    .bind(user_id)
    .bind(work_date)
    .bind(exclude_id)
    .fetch_one(conn)
    .await?;
    Ok(total.unwrap_or(0.0))
}
