//! Company activity feed.

use axum::extract::{Query, State};
use axum::Json;
use hms_db::models::event::ActivityEntry;
use hms_db::repositories::EventRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/activity
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ActivityEntry>>>> {
    let (limit, offset) = page.resolve();
    let data = EventRepo::list_for_bedrift(&state.pool, auth.bedrift_id, limit, offset).await?;
    Ok(Json(DataResponse { data }))
}
