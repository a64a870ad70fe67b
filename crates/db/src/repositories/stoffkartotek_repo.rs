//! Repository for the `stoffkartotek` table and its hazard symbol tags.

use hms_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::stoffkartotek::{CreateStoffkartotek, Stoffkartotek, UpdateStoffkartotek};

/// Column list for `stoffkartotek s`, with symbols aggregated in insertion order.
const COLUMNS: &str = "s.id, s.bedrift_id, s.product_name, s.manufacturer, s.cas_number, \
    s.description, s.usage_area, s.storage_location, s.datasheet_key, \
    COALESCE(
        (SELECT array_agg(f.symbol ORDER BY f.id)
         FROM stoffkartotek_faresymboler f WHERE f.stoffkartotek_id = s.id),
        ARRAY[]::TEXT[]
    ) AS hazard_symbols, \
    s.created_at, s.updated_at";

/// Provides CRUD operations for the chemical register.
pub struct StoffkartotekRepo;

impl StoffkartotekRepo {
    /// Insert a product with its hazard symbols.
    ///
    /// `symbols` must already be validated and de-duplicated.
    pub async fn create(
        pool: &PgPool,
        bedrift_id: DbId,
        input: &CreateStoffkartotek,
        symbols: &[String],
    ) -> Result<Stoffkartotek, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO stoffkartotek
                (bedrift_id, product_name, manufacturer, cas_number, description,
                 usage_area, storage_location)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(bedrift_id)
        .bind(&input.product_name)
        .bind(&input.manufacturer)
        .bind(&input.cas_number)
        .bind(&input.description)
        .bind(&input.usage_area)
        .bind(&input.storage_location)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_symbols(&mut tx, id, symbols).await?;
        let row = Self::fetch_in_tx(&mut tx, id).await?;

        tx.commit().await?;
        Ok(row)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<Stoffkartotek>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stoffkartotek s WHERE s.id = $1 AND s.bedrift_id = $2"
        );
        sqlx::query_as::<_, Stoffkartotek>(&query)
            .bind(id)
            .bind(bedrift_id)
            .fetch_optional(pool)
            .await
    }

    /// List a company's products by name, optionally filtered by an ILIKE
    /// pattern over product name and manufacturer.
    pub async fn list(
        pool: &PgPool,
        bedrift_id: DbId,
        pattern: Option<&str>,
    ) -> Result<Vec<Stoffkartotek>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stoffkartotek s
             WHERE s.bedrift_id = $1
               AND ($2::TEXT IS NULL OR s.product_name ILIKE $2 OR s.manufacturer ILIKE $2)
             ORDER BY s.product_name, s.id"
        );
        sqlx::query_as::<_, Stoffkartotek>(&query)
            .bind(bedrift_id)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }

    /// Update a product. `symbols`, when `Some`, replaces the symbol set in
    /// the same transaction.
    pub async fn update(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        input: &UpdateStoffkartotek,
        symbols: Option<&[String]>,
    ) -> Result<Option<Stoffkartotek>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE stoffkartotek SET
                product_name = COALESCE($3, product_name),
                manufacturer = COALESCE($4, manufacturer),
                cas_number = COALESCE($5, cas_number),
                description = COALESCE($6, description),
                usage_area = COALESCE($7, usage_area),
                storage_location = COALESCE($8, storage_location)
             WHERE id = $1 AND bedrift_id = $2
             RETURNING id",
        )
        .bind(id)
        .bind(bedrift_id)
        .bind(&input.product_name)
        .bind(&input.manufacturer)
        .bind(&input.cas_number)
        .bind(&input.description)
        .bind(&input.usage_area)
        .bind(&input.storage_location)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = updated else {
            return Ok(None);
        };

        if let Some(symbols) = symbols {
            Self::replace_symbols(&mut tx, id, symbols).await?;
        }
        let row = Self::fetch_in_tx(&mut tx, id).await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Delete a product and its symbol tags in one transaction.
    ///
    /// Returns `None` if the product does not exist, otherwise the datasheet
    /// object key (if any) for the caller to remove from storage.
    pub async fn delete_cascade(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let found: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT datasheet_key FROM stoffkartotek WHERE id = $1 AND bedrift_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(bedrift_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((datasheet_key,)) = found else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM stoffkartotek_faresymboler WHERE stoffkartotek_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM stoffkartotek WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(datasheet_key))
    }

    /// Point a product at a new datasheet object.
    ///
    /// Returns `None` if the product does not exist, otherwise the previous
    /// key (if any) so the caller can delete the replaced object.
    pub async fn set_datasheet(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        key: &str,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let found: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT datasheet_key FROM stoffkartotek WHERE id = $1 AND bedrift_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(bedrift_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((previous,)) = found else {
            return Ok(None);
        };

        sqlx::query("UPDATE stoffkartotek SET datasheet_key = $2 WHERE id = $1")
            .bind(id)
            .bind(key)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(previous))
    }

    async fn replace_symbols(
        tx: &mut Transaction<'_, Postgres>,
        stoffkartotek_id: DbId,
        symbols: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM stoffkartotek_faresymboler WHERE stoffkartotek_id = $1")
            .bind(stoffkartotek_id)
            .execute(&mut **tx)
            .await?;

        if !symbols.is_empty() {
            sqlx::query(
                "INSERT INTO stoffkartotek_faresymboler (stoffkartotek_id, symbol)
                 SELECT $1, symbol FROM UNNEST($2::TEXT[]) WITH ORDINALITY AS t(symbol, ord)
                 ORDER BY ord",
            )
            .bind(stoffkartotek_id)
            .bind(symbols)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn fetch_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Stoffkartotek, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stoffkartotek s WHERE s.id = $1");
        sqlx::query_as::<_, Stoffkartotek>(&query)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }
}
