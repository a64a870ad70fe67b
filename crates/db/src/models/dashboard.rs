//! Aggregates shown on the start page.

use serde::Serialize;
use sqlx::FromRow;

/// Number of rows sharing one value of a grouping key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: i64,
}

/// Per-user dashboard summary.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub projects_by_status: Vec<KeyCount>,
    pub my_open_tasks: i64,
    pub hours_this_week: f64,
    pub open_forms_by_type: Vec<KeyCount>,
    pub low_stock_products: i64,
    pub unread_notifications: i64,
}
