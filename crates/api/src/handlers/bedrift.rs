//! Handlers for the caller's own company (`/bedrift`).

use axum::extract::State;
use axum::Json;
use hms_core::error::CoreError;
use hms_db::models::bedrift::{Bedrift, UpdateBedrift};
use hms_db::models::user::Colleague;
use hms_db::repositories::{BedriftRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/bedrift
pub async fn get_own(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Bedrift>> {
    let bedrift = BedriftRepo::find_by_id(&state.pool, auth.bedrift_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Bedrift",
            id: auth.bedrift_id,
        }))?;
    Ok(Json(bedrift))
}

/// PUT /api/v1/bedrift
///
/// Company admins update name and address. Activation is left to support
/// staff (`PUT /support/bedrifter/{id}`).
pub async fn update_own(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(mut input): Json<UpdateBedrift>,
) -> AppResult<Json<Bedrift>> {
    input.validate()?;
    input.is_active = None;

    let bedrift = BedriftRepo::update(&state.pool, admin.bedrift_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Bedrift",
            id: admin.bedrift_id,
        }))?;
    Ok(Json(bedrift))
}

/// GET /api/v1/bedrift/ansatte
///
/// Active employees of the caller's company, for assignee pickers.
pub async fn list_colleagues(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Colleague>>>> {
    let data = UserRepo::list_colleagues(&state.pool, auth.bedrift_id).await?;
    Ok(Json(DataResponse { data }))
}
