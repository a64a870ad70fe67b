//! Aggregate queries for the per-user dashboard.

use hms_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::dashboard::{Dashboard, KeyCount};
use crate::repositories::{NotificationRepo, TimeEntryRepo};

/// Provides the dashboard summary.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Build the dashboard for `user_id`; `week` is the `(monday, sunday)`
    /// range used for the hours total.
    pub async fn summary(
        pool: &PgPool,
        bedrift_id: DbId,
        user_id: DbId,
        week: (Date, Date),
    ) -> Result<Dashboard, sqlx::Error> {
        let projects_by_status = sqlx::query_as::<_, KeyCount>(
            "SELECT status AS key, COUNT(*) AS count FROM prosjekter
             WHERE bedrift_id = $1
             GROUP BY status ORDER BY status",
        )
        .bind(bedrift_id)
        .fetch_all(pool)
        .await?;

        let my_open_tasks: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM oppgaver
             WHERE bedrift_id = $1 AND assigned_user_id = $2 AND status <> 'fullfort'",
        )
        .bind(bedrift_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        let open_forms_by_type = sqlx::query_as::<_, KeyCount>(
            "SELECT skjema_type AS key, COUNT(*) AS count FROM skjemaer
             WHERE bedrift_id = $1 AND status <> 'lukket'
             GROUP BY skjema_type ORDER BY skjema_type",
        )
        .bind(bedrift_id)
        .fetch_all(pool)
        .await?;

        let low_stock_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lager_produkter
             WHERE bedrift_id = $1 AND quantity < min_quantity",
        )
        .bind(bedrift_id)
        .fetch_one(pool)
        .await?;

        let hours_this_week = TimeEntryRepo::hours_in_period(pool, user_id, week.0, week.1).await?;
        let unread_notifications = NotificationRepo::unread_count(pool, user_id).await?;

        Ok(Dashboard {
            projects_by_status,
            my_open_tasks,
            hours_this_week,
            open_forms_by_type,
            low_stock_products,
            unread_notifications,
        })
    }
}
