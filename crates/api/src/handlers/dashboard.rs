//! Per-user dashboard summary.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use hms_core::time_entry::week_bounds;
use hms_db::models::dashboard::Dashboard;
use hms_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// Hours are totalled over the current Monday-Sunday week.
pub async fn get(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Dashboard>> {
    let week = week_bounds(Utc::now().date_naive());
    let dashboard =
        DashboardRepo::summary(&state.pool, auth.bedrift_id, auth.user_id, week).await?;
    Ok(Json(dashboard))
}
