//! Repository for the `bedrifter` table.

use hms_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::bedrift::{Bedrift, BedriftSummary, CreateBedrift, UpdateBedrift};
use crate::models::support_logg::CreateSupportLogg;
use crate::models::user::{CreateUser, User};
use crate::repositories::support_logg_repo::SupportLoggRepo;
use crate::repositories::user_repo::UserRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, orgnummer, address, postal_code, city, is_active, created_at, updated_at";

/// Provides CRUD operations for companies.
pub struct BedriftRepo;

impl BedriftRepo {
    /// Insert a new company, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBedrift) -> Result<Bedrift, sqlx::Error> {
        let query = format!(
            "INSERT INTO bedrifter (name, orgnummer, address, postal_code, city)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bedrift>(&query)
            .bind(&input.name)
            .bind(&input.orgnummer)
            .bind(&input.address)
            .bind(&input.postal_code)
            .bind(&input.city)
            .fetch_one(pool)
            .await
    }

    /// Create a company and its first administrator in one transaction,
    /// together with the support log entry `log` builds from the new rows.
    ///
    /// `admin.bedrift_id` is ignored and replaced with the new company's ID.
    pub async fn create_with_admin<F>(
        pool: &PgPool,
        input: &CreateBedrift,
        admin: &CreateUser,
        logged_by: DbId,
        log: F,
    ) -> Result<(Bedrift, User), sqlx::Error>
    where
        F: FnOnce(&Bedrift, &User) -> CreateSupportLogg,
    {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO bedrifter (name, orgnummer, address, postal_code, city)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let bedrift = sqlx::query_as::<_, Bedrift>(&query)
            .bind(&input.name)
            .bind(&input.orgnummer)
            .bind(&input.address)
            .bind(&input.postal_code)
            .bind(&input.city)
            .fetch_one(&mut *tx)
            .await?;

        let admin = CreateUser {
            bedrift_id: bedrift.id,
            ..admin.clone()
        };
        let user = UserRepo::create_in_tx(&mut tx, &admin).await?;
        SupportLoggRepo::create_in_tx(&mut tx, logged_by, &log(&bedrift, &user)).await?;

        tx.commit().await?;
        Ok((bedrift, user))
    }

    /// Find a company by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Bedrift>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bedrifter WHERE id = $1");
        sqlx::query_as::<_, Bedrift>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all companies with their user counts, by name.
    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<BedriftSummary>, sqlx::Error> {
        sqlx::query_as::<_, BedriftSummary>(
            "SELECT b.id, b.name, b.orgnummer, b.city, b.is_active,
                    COUNT(u.id) AS user_count, b.created_at
             FROM bedrifter b
             LEFT JOIN users u ON u.bedrift_id = b.id
             GROUP BY b.id
             ORDER BY b.name",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a company. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBedrift,
    ) -> Result<Option<Bedrift>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let bedrift = Self::update_in_tx(&mut tx, id, input).await?;
        tx.commit().await?;
        Ok(bedrift)
    }

    /// Update a company and record the support log entry `log` builds from
    /// the updated row, in one transaction.
    pub async fn update_logged<F>(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBedrift,
        logged_by: DbId,
        log: F,
    ) -> Result<Option<Bedrift>, sqlx::Error>
    where
        F: FnOnce(&Bedrift) -> CreateSupportLogg,
    {
        let mut tx = pool.begin().await?;
        let Some(bedrift) = Self::update_in_tx(&mut tx, id, input).await? else {
            return Ok(None);
        };
        SupportLoggRepo::create_in_tx(&mut tx, logged_by, &log(&bedrift)).await?;
        tx.commit().await?;
        Ok(Some(bedrift))
    }

    async fn update_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &UpdateBedrift,
    ) -> Result<Option<Bedrift>, sqlx::Error> {
        let query = format!(
            "UPDATE bedrifter SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                postal_code = COALESCE($4, postal_code),
                city = COALESCE($5, city),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bedrift>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.postal_code)
            .bind(&input.city)
            .bind(input.is_active)
            .fetch_optional(&mut **tx)
            .await
    }
}
