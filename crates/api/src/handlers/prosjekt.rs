//! Handlers for the `/prosjekter` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::error::CoreError;
use hms_core::events::{ENTITY_PROSJEKT, EVENT_PROSJEKT_CREATED, EVENT_PROSJEKT_DELETED};
use hms_core::prosjekt::{validate_date_range, validate_status};
use hms_core::types::DbId;
use hms_db::models::prosjekt::{
    CreateProsjekt, Prosjekt, ProsjektDeleteSummary, ProsjektDetail, UpdateProsjekt,
};
use hms_db::repositories::ProsjektRepo;
use hms_events::PlatformEvent;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireLeder, RequireProsjektleder};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /prosjekter`.
#[derive(Debug, Deserialize)]
pub struct ProsjektListQuery {
    pub status: Option<String>,
}

/// GET /api/v1/prosjekter
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProsjektListQuery>,
) -> AppResult<Json<DataResponse<Vec<Prosjekt>>>> {
    if let Some(status) = params.status.as_deref() {
        validate_status(status)?;
    }
    let data = ProsjektRepo::list(&state.pool, auth.bedrift_id, params.status.as_deref()).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/prosjekter
pub async fn create(
    State(state): State<AppState>,
    RequireProsjektleder(user): RequireProsjektleder,
    Json(input): Json<CreateProsjekt>,
) -> AppResult<(StatusCode, Json<Prosjekt>)> {
    input.validate()?;
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    validate_date_range(input.start_date, input.end_date)?;

    let prosjekt = ProsjektRepo::create(&state.pool, user.bedrift_id, user.user_id, &input).await?;

    state.publish(
        PlatformEvent::new(EVENT_PROSJEKT_CREATED)
            .with_bedrift(user.bedrift_id)
            .with_source(ENTITY_PROSJEKT, prosjekt.id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({ "name": prosjekt.name })),
    );

    Ok((StatusCode::CREATED, Json(prosjekt)))
}

/// GET /api/v1/prosjekter/{id}
///
/// The project with task counts per status and total logged hours.
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProsjektDetail>> {
    let prosjekt = ProsjektRepo::find_by_id(&state.pool, auth.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prosjekt",
            id,
        }))?;

    let task_counts = ProsjektRepo::task_counts(&state.pool, prosjekt.id).await?;
    let total_hours = ProsjektRepo::total_hours(&state.pool, prosjekt.id).await?;

    Ok(Json(ProsjektDetail {
        prosjekt,
        task_counts,
        total_hours,
    }))
}

/// PUT /api/v1/prosjekter/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProsjektleder(user): RequireProsjektleder,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProsjekt>,
) -> AppResult<Json<Prosjekt>> {
    input.validate()?;
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }

    let existing = ProsjektRepo::find_by_id(&state.pool, user.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prosjekt",
            id,
        }))?;
    validate_date_range(
        input.start_date.or(existing.start_date),
        input.end_date.or(existing.end_date),
    )?;

    let prosjekt = ProsjektRepo::update(&state.pool, user.bedrift_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prosjekt",
            id,
        }))?;
    Ok(Json(prosjekt))
}

/// DELETE /api/v1/prosjekter/{id}
///
/// Delete the project with its tasks, attachments and time entries in one
/// transaction, then remove the attachment objects from storage.
pub async fn delete(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProsjektDeleteSummary>> {
    let summary = ProsjektRepo::delete_cascade(&state.pool, user.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prosjekt",
            id,
        }))?;

    state.remove_objects(&summary.file_keys).await;

    tracing::info!(
        prosjekt_id = id,
        bedrift_id = user.bedrift_id,
        deleted_tasks = summary.deleted_tasks,
        deleted_time_entries = summary.deleted_time_entries,
        deleted_files = summary.deleted_files,
        "Project deleted"
    );
    state.publish(
        PlatformEvent::new(EVENT_PROSJEKT_DELETED)
            .with_bedrift(user.bedrift_id)
            .with_source(ENTITY_PROSJEKT, id)
            .with_actor(user.user_id)
            .with_payload(serde_json::to_value(&summary).unwrap_or_default()),
    );

    Ok(Json(summary))
}
