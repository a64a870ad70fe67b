//! Repository for the `users` table.

use hms_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::user::{Colleague, CreateUser, UpdateProfile, UpdateUser, User};

/// Column list shared across queries, for `users u JOIN roles r`.
const COLUMNS: &str = "u.id, u.bedrift_id, u.first_name, u.last_name, u.email, u.password_hash, \
    u.role_id, r.name AS role, u.position, u.phone, u.is_active, u.last_login_at, \
    u.failed_login_count, u.locked_until, u.created_at, u.updated_at";

const FROM: &str = "users u JOIN roles r ON r.id = u.role_id";

/// Provides CRUD and login bookkeeping for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// Emails are stored lower-cased; `uq_users_email` rejects duplicates.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let user = Self::create_in_tx(&mut tx, input).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Insert a user inside an existing transaction.
    pub(crate) async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "WITH inserted AS (
                INSERT INTO users
                    (bedrift_id, first_name, last_name, email, password_hash, role_id, position, phone)
                VALUES ($1, $2, $3, lower($4), $5, (SELECT id FROM roles WHERE name = $6), $7, $8)
                RETURNING *
             )
             SELECT {COLUMNS} FROM inserted u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.bedrift_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.position)
            .bind(&input.phone)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a user by internal ID, regardless of company.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE u.id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user of a specific company.
    pub async fn find_in_bedrift(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE u.id = $1 AND u.bedrift_id = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(bedrift_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE lower(u.email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all users of a company, active first, then by name.
    pub async fn list_for_bedrift(
        pool: &PgPool,
        bedrift_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE u.bedrift_id = $1
             ORDER BY u.is_active DESC, u.last_name, u.first_name"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(bedrift_id)
            .fetch_all(pool)
            .await
    }

    /// List the active employees of a company.
    pub async fn list_colleagues(
        pool: &PgPool,
        bedrift_id: DbId,
    ) -> Result<Vec<Colleague>, sqlx::Error> {
        let query = format!(
            "SELECT u.id, u.first_name, u.last_name, u.email, r.name AS role, u.position
             FROM {FROM}
             WHERE u.bedrift_id = $1 AND u.is_active = true
             ORDER BY u.last_name, u.first_name"
        );
        sqlx::query_as::<_, Colleague>(&query)
            .bind(bedrift_id)
            .fetch_all(pool)
            .await
    }

    /// Whether `user_id` is an active user of `bedrift_id`.
    pub async fn is_active_member(
        pool: &PgPool,
        bedrift_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM users WHERE id = $1 AND bedrift_id = $2 AND is_active = true
             )",
        )
        .bind(user_id)
        .bind(bedrift_id)
        .fetch_one(pool)
        .await
    }

    /// IDs of the active users of a company holding one of `roles`.
    pub async fn list_ids_with_roles(
        pool: &PgPool,
        bedrift_id: DbId,
        roles: &[&str],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        let query = format!(
            "SELECT u.id FROM {FROM}
             WHERE u.bedrift_id = $1 AND u.is_active = true AND r.name = ANY($2)
             ORDER BY u.id"
        );
        sqlx::query_scalar(&query)
            .bind(bedrift_id)
            .bind(roles)
            .fetch_all(pool)
            .await
    }

    /// Update a user of a company. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no such user exists in the company.
    pub async fn update(
        pool: &PgPool,
        bedrift_id: DbId,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "WITH updated AS (
                UPDATE users SET
                    first_name = COALESCE($3, first_name),
                    last_name = COALESCE($4, last_name),
                    role_id = COALESCE((SELECT id FROM roles WHERE name = $5), role_id),
                    position = COALESCE($6, position),
                    phone = COALESCE($7, phone),
                    is_active = COALESCE($8, is_active)
                WHERE id = $1 AND bedrift_id = $2
                RETURNING *
             )
             SELECT {COLUMNS} FROM updated u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(bedrift_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.role)
            .bind(&input.position)
            .bind(&input.phone)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Update the caller's own profile fields.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "WITH updated AS (
                UPDATE users SET
                    first_name = COALESCE($2, first_name),
                    last_name = COALESCE($3, last_name),
                    position = COALESCE($4, position),
                    phone = COALESCE($5, phone)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM updated u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.position)
            .bind(&input.phone)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, bedrift_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = false
             WHERE id = $1 AND bedrift_id = $2 AND is_active = true",
        )
        .bind(id)
        .bind(bedrift_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment the failed login counter by 1, returning the new count.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE users SET failed_login_count = failed_login_count + 1
             WHERE id = $1
             RETURNING failed_login_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update a user's password hash and clear any lockout.
    ///
    /// Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                password_hash = $2,
                failed_login_count = 0,
                locked_until = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
