//! Repository for warehouse stock: `lager_produkter` and `lager_bevegelser`.

use hms_core::lager;
use hms_core::types::DbId;
use sqlx::PgPool;

use crate::error::TxError;
use crate::models::lager::{
    CreateLagerBevegelse, CreateLagerProdukt, LagerBevegelse, LagerProdukt, MovementResult,
    UpdateLagerProdukt,
};

const COLUMNS: &str = "id, bedrift_id, name, description, supplier, category, unit, quantity, \
    min_quantity, location, created_at, updated_at";

const MOVEMENT_COLUMNS: &str = "id, bedrift_id, produkt_id, user_id, prosjekt_id, movement_type, \
    quantity_change, quantity_after, comment, created_at, updated_at";

/// Provides CRUD operations for stock items and their movement ledger.
pub struct LagerRepo;

impl LagerRepo {
    pub async fn create(
        pool: &PgPool,
        bedrift_id: DbId,
        input: &CreateLagerProdukt,
    ) -> Result<LagerProdukt, sqlx::Error> {
        let query = format!(
            "INSERT INTO lager_produkter
                (bedrift_id, name, description, supplier, category, unit, quantity,
                 min_quantity, location)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'stk'), COALESCE($7, 0),
                     COALESCE($8, 0), $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LagerProdukt>(&query)
            .bind(bedrift_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.supplier)
            .bind(&input.category)
            .bind(&input.unit)
            .bind(input.quantity)
            .bind(input.min_quantity)
            .bind(&input.location)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<LagerProdukt>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM lager_produkter WHERE id = $1 AND bedrift_id = $2");
        sqlx::query_as::<_, LagerProdukt>(&query)
            .bind(id)
            .bind(bedrift_id)
            .fetch_optional(pool)
            .await
    }

    /// List a company's stock items by name; `low_stock_only` keeps those
    /// below their minimum.
    pub async fn list(
        pool: &PgPool,
        bedrift_id: DbId,
        low_stock_only: bool,
    ) -> Result<Vec<LagerProdukt>, sqlx::Error> {
        let filter = if low_stock_only {
            "AND quantity < min_quantity"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM lager_produkter
             WHERE bedrift_id = $1 {filter}
             ORDER BY name, id"
        );
        sqlx::query_as::<_, LagerProdukt>(&query)
            .bind(bedrift_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        input: &UpdateLagerProdukt,
    ) -> Result<Option<LagerProdukt>, sqlx::Error> {
        let query = format!(
            "UPDATE lager_produkter SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                supplier = COALESCE($5, supplier),
                category = COALESCE($6, category),
                unit = COALESCE($7, unit),
                min_quantity = COALESCE($8, min_quantity),
                location = COALESCE($9, location)
             WHERE id = $1 AND bedrift_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LagerProdukt>(&query)
            .bind(id)
            .bind(bedrift_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.supplier)
            .bind(&input.category)
            .bind(&input.unit)
            .bind(input.min_quantity)
            .bind(&input.location)
            .fetch_optional(pool)
            .await
    }

    /// Delete a stock item together with its movement history.
    ///
    /// Returns `true` if the item existed.
    pub async fn delete_cascade(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM lager_bevegelser WHERE produkt_id = $1 AND bedrift_id = $2")
            .bind(id)
            .bind(bedrift_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM lager_produkter WHERE id = $1 AND bedrift_id = $2")
            .bind(id)
            .bind(bedrift_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    /// Apply a stock movement with the product row locked.
    ///
    /// The new quantity is computed from the locked row, so concurrent
    /// withdrawals cannot drive the stock negative. Returns `None` if the
    /// product does not exist in the company.
    pub async fn record_movement(
        pool: &PgPool,
        bedrift_id: DbId,
        produkt_id: DbId,
        user_id: DbId,
        input: &CreateLagerBevegelse,
    ) -> Result<Option<MovementResult>, TxError> {
        let mut tx = pool.begin().await?;

        let locked: Option<(i32, i32)> = sqlx::query_as(
            "SELECT quantity, min_quantity FROM lager_produkter
             WHERE id = $1 AND bedrift_id = $2
             FOR UPDATE",
        )
        .bind(produkt_id)
        .bind(bedrift_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((before, min_quantity)) = locked else {
            return Ok(None);
        };

        let outcome = lager::apply_movement(&input.movement_type, input.quantity, before)?;

        let query = format!(
            "UPDATE lager_produkter SET quantity = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let produkt = sqlx::query_as::<_, LagerProdukt>(&query)
            .bind(produkt_id)
            .bind(outcome.quantity_after)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO lager_bevegelser
                (bedrift_id, produkt_id, user_id, prosjekt_id, movement_type,
                 quantity_change, quantity_after, comment)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {MOVEMENT_COLUMNS}"
        );
        let bevegelse = sqlx::query_as::<_, LagerBevegelse>(&query)
            .bind(bedrift_id)
            .bind(produkt_id)
            .bind(user_id)
            .bind(input.prosjekt_id)
            .bind(&input.movement_type)
            .bind(outcome.change)
            .bind(outcome.quantity_after)
            .bind(&input.comment)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(MovementResult {
            produkt,
            bevegelse,
            crossed_below_minimum: lager::crossed_below_minimum(
                before,
                outcome.quantity_after,
                min_quantity,
            ),
        }))
    }

    /// A product's movement ledger, newest first.
    pub async fn list_movements(
        pool: &PgPool,
        bedrift_id: DbId,
        produkt_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LagerBevegelse>, sqlx::Error> {
        let query = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM lager_bevegelser
             WHERE produkt_id = $1 AND bedrift_id = $2
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, LagerBevegelse>(&query)
            .bind(produkt_id)
            .bind(bedrift_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
