//! Reads from the `roles` lookup table.

use sqlx::PgPool;

use crate::models::role::Role;

pub struct RoleRepo;

impl RoleRepo {
    /// The roles among `names`, most privileged first.
    pub async fn list_named(pool: &PgPool, names: &[&str]) -> Result<Vec<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at, updated_at FROM roles
             WHERE name = ANY($1)
             ORDER BY id",
        )
        .bind(names)
        .fetch_all(pool)
        .await
    }
}
