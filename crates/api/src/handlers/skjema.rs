//! Handlers for safety forms (`/skjemaer`): avvik, endring, SJA and
//! risikovurdering.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::error::CoreError;
use hms_core::events::{ENTITY_SKJEMA, EVENT_SKJEMA_STATUS_CHANGED, EVENT_SKJEMA_SUBMITTED};
use hms_core::roles::{ROLE_LEDER, ROLE_PROSJEKTLEDER};
use hms_core::skjema::{validate_content, validate_status, validate_type, STATUS_LUKKET, STATUS_NY};
use hms_core::types::DbId;
use hms_db::models::skjema::{
    CreateSkjema, Skjema, SkjemaFilter, SkjemaStatusChange, UpdateSkjema,
};
use hms_db::repositories::{ProsjektRepo, SkjemaRepo};
use hms_events::PlatformEvent;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireLeder};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /skjemaer`.
#[derive(Debug, Default, Deserialize)]
pub struct SkjemaListQuery {
    pub skjema_type: Option<String>,
    pub status: Option<String>,
    pub prosjekt_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/skjemaer
///
/// Submit a form. The business number is assigned atomically.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateSkjema>,
) -> AppResult<(StatusCode, Json<Skjema>)> {
    input.validate()?;
    validate_content(&input.skjema_type, input.severity.as_deref(), &input.details)?;
    if let Some(prosjekt_id) = input.prosjekt_id {
        ensure_prosjekt(&state, auth.bedrift_id, prosjekt_id).await?;
    }

    let skjema = SkjemaRepo::create(&state.pool, auth.bedrift_id, auth.user_id, &input).await?;
    tracing::info!(skjema_id = skjema.id, number = %skjema.number, "Form submitted");

    state.publish(
        PlatformEvent::new(EVENT_SKJEMA_SUBMITTED)
            .with_bedrift(auth.bedrift_id)
            .with_source(ENTITY_SKJEMA, skjema.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "number": skjema.number,
                "title": skjema.title,
                "skjema_type": skjema.skjema_type,
                "severity": skjema.severity,
            })),
    );

    Ok((StatusCode::CREATED, Json(skjema)))
}

/// GET /api/v1/skjemaer
///
/// `bruker` sees only forms they submitted.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SkjemaListQuery>,
) -> AppResult<Json<DataResponse<Vec<Skjema>>>> {
    if let Some(t) = params.skjema_type.as_deref() {
        validate_type(t)?;
    }
    if let Some(s) = params.status.as_deref() {
        validate_status(s)?;
    }
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let filter = SkjemaFilter {
        skjema_type: params.skjema_type,
        status: params.status,
        prosjekt_id: params.prosjekt_id,
        submitted_by: (!auth.has_role(ROLE_PROSJEKTLEDER)).then_some(auth.user_id),
    };
    let data = SkjemaRepo::list(&state.pool, auth.bedrift_id, &filter, limit, offset).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/skjemaer/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Skjema>> {
    let skjema = find_visible(&state, &auth, id).await?;
    Ok(Json(skjema))
}

/// PUT /api/v1/skjemaer/{id}
///
/// The submitter may edit while the form is `ny`; leaders may edit until it
/// is closed.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSkjema>,
) -> AppResult<Json<Skjema>> {
    input.validate()?;
    let existing = find_visible(&state, &auth, id).await?;

    let is_leader = auth.has_role(ROLE_LEDER);
    let own_new = existing.submitted_by == Some(auth.user_id) && existing.status == STATUS_NY;
    if !(own_new || is_leader) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the submitter can edit a new form".into(),
        )));
    }
    if existing.status == STATUS_LUKKET {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Form {} is closed",
            existing.number
        ))));
    }

    validate_content(
        &existing.skjema_type,
        input.severity.as_deref().or(existing.severity.as_deref()),
        input.details.as_ref().unwrap_or(&existing.details),
    )?;
    if let Some(prosjekt_id) = input.prosjekt_id {
        ensure_prosjekt(&state, auth.bedrift_id, prosjekt_id).await?;
    }

    // The permission check above holds only for the status it was made against.
    let skjema = SkjemaRepo::update(&state.pool, auth.bedrift_id, id, &existing.status, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Form {} changed status while being edited",
                existing.number
            )))
        })?;
    Ok(Json(skjema))
}

/// POST /api/v1/skjemaer/{id}/status
///
/// Move a form through `ny -> under_behandling -> lukket` (leder+).
pub async fn change_status(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Path(id): Path<DbId>,
    Json(input): Json<SkjemaStatusChange>,
) -> AppResult<Json<Skjema>> {
    input.validate()?;
    validate_status(&input.status)?;

    let skjema = SkjemaRepo::change_status(
        &state.pool,
        user.bedrift_id,
        id,
        &input.status,
        user.user_id,
        input.comment.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Skjema",
        id,
    }))?;

    tracing::info!(skjema_id = id, status = %skjema.status, handled_by = user.user_id, "Form status changed");
    state.publish(
        PlatformEvent::new(EVENT_SKJEMA_STATUS_CHANGED)
            .with_bedrift(user.bedrift_id)
            .with_source(ENTITY_SKJEMA, skjema.id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({
                "number": skjema.number,
                "status": skjema.status,
                "submitted_by": skjema.submitted_by,
            })),
    );

    Ok(Json(skjema))
}

/// DELETE /api/v1/skjemaer/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SkjemaRepo::delete(&state.pool, admin.bedrift_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Skjema",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a form the caller may see. Other users' forms answer 404 to `bruker`.
async fn find_visible(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Skjema> {
    SkjemaRepo::find_by_id(&state.pool, auth.bedrift_id, id)
        .await?
        .filter(|s| auth.has_role(ROLE_PROSJEKTLEDER) || s.submitted_by == Some(auth.user_id))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Skjema",
            id,
        }))
}

async fn ensure_prosjekt(state: &AppState, bedrift_id: DbId, prosjekt_id: DbId) -> AppResult<()> {
    if ProsjektRepo::find_by_id(&state.pool, bedrift_id, prosjekt_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Prosjekt {prosjekt_id} does not exist"
        ))));
    }
    Ok(())
}
