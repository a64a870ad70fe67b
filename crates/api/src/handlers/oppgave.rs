//! Handlers for tasks (`/prosjekter/{id}/oppgaver`, `/oppgaver`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::error::CoreError;
use hms_core::events::{ENTITY_OPPGAVE, EVENT_OPPGAVE_ASSIGNED};
use hms_core::oppgave::{validate_estimated_hours, validate_priority, validate_status};
use hms_core::roles::ROLE_PROSJEKTLEDER;
use hms_core::types::DbId;
use hms_db::models::oppgave::{
    CreateOppgave, Oppgave, OppgaveDeleteSummary, UpdateOppgave, UpdateOppgaveStatus,
};
use hms_db::repositories::{OppgaveRepo, ProsjektRepo, UserRepo};
use hms_events::PlatformEvent;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireProsjektleder;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/prosjekter/{id}/oppgaver
///
/// Kanban board: tasks ordered by status column, then position.
pub async fn list_for_prosjekt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prosjekt_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Oppgave>>>> {
    ensure_prosjekt(&state, auth.bedrift_id, prosjekt_id).await?;
    let data = OppgaveRepo::list_for_prosjekt(&state.pool, auth.bedrift_id, prosjekt_id).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/prosjekter/{id}/oppgaver
pub async fn create(
    State(state): State<AppState>,
    RequireProsjektleder(user): RequireProsjektleder,
    Path(prosjekt_id): Path<DbId>,
    Json(input): Json<CreateOppgave>,
) -> AppResult<(StatusCode, Json<Oppgave>)> {
    input.validate()?;
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    if let Some(priority) = input.priority.as_deref() {
        validate_priority(priority)?;
    }
    validate_estimated_hours(input.estimated_hours)?;
    ensure_prosjekt(&state, user.bedrift_id, prosjekt_id).await?;
    if let Some(assignee) = input.assigned_user_id {
        ensure_assignable(&state, user.bedrift_id, assignee).await?;
    }

    let oppgave =
        OppgaveRepo::create(&state.pool, user.bedrift_id, prosjekt_id, user.user_id, &input)
            .await?;

    if oppgave.assigned_user_id.is_some() {
        publish_assigned(&state, user.user_id, &oppgave);
    }

    Ok((StatusCode::CREATED, Json(oppgave)))
}

/// GET /api/v1/oppgaver/mine
///
/// The caller's open tasks across all projects.
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Oppgave>>>> {
    let data = OppgaveRepo::list_open_for_user(&state.pool, auth.bedrift_id, auth.user_id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/oppgaver/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Oppgave>> {
    let oppgave = find_oppgave(&state, auth.bedrift_id, id).await?;
    Ok(Json(oppgave))
}

/// PUT /api/v1/oppgaver/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireProsjektleder(user): RequireProsjektleder,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOppgave>,
) -> AppResult<Json<Oppgave>> {
    input.validate()?;
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    if let Some(priority) = input.priority.as_deref() {
        validate_priority(priority)?;
    }
    validate_estimated_hours(input.estimated_hours)?;

    let before = find_oppgave(&state, user.bedrift_id, id).await?;
    if let (Some(assignee), false) = (input.assigned_user_id, input.unassign) {
        ensure_assignable(&state, user.bedrift_id, assignee).await?;
    }

    let oppgave = OppgaveRepo::update(&state.pool, user.bedrift_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oppgave",
            id,
        }))?;

    if oppgave.assigned_user_id.is_some() && oppgave.assigned_user_id != before.assigned_user_id {
        publish_assigned(&state, user.user_id, &oppgave);
    }

    Ok(Json(oppgave))
}

/// PATCH /api/v1/oppgaver/{id}/status
///
/// Kanban move. Allowed for the assignee and for prosjektleder or higher.
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOppgaveStatus>,
) -> AppResult<Json<Oppgave>> {
    validate_status(&input.status)?;
    if input.position.is_some_and(|p| p < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "Position must not be negative".into(),
        )));
    }

    let existing = find_oppgave(&state, auth.bedrift_id, id).await?;
    if existing.assigned_user_id != Some(auth.user_id) && !auth.has_role(ROLE_PROSJEKTLEDER) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the assignee or a project manager can move this task".into(),
        )));
    }

    let oppgave = OppgaveRepo::update_status(
        &state.pool,
        auth.bedrift_id,
        id,
        &input.status,
        input.position,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Oppgave",
        id,
    }))?;
    Ok(Json(oppgave))
}

/// DELETE /api/v1/oppgaver/{id}
///
/// Deletes the task and its attachments; logged hours stay on the project.
pub async fn delete(
    State(state): State<AppState>,
    RequireProsjektleder(user): RequireProsjektleder,
    Path(id): Path<DbId>,
) -> AppResult<Json<OppgaveDeleteSummary>> {
    let summary = OppgaveRepo::delete_cascade(&state.pool, user.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oppgave",
            id,
        }))?;

    state.remove_objects(&summary.file_keys).await;
    tracing::info!(
        oppgave_id = id,
        deleted_files = summary.deleted_files,
        detached_time_entries = summary.detached_time_entries,
        "Task deleted"
    );

    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_oppgave(state: &AppState, bedrift_id: DbId, id: DbId) -> AppResult<Oppgave> {
    OppgaveRepo::find_by_id(&state.pool, bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Oppgave",
            id,
        }))
}

async fn ensure_prosjekt(state: &AppState, bedrift_id: DbId, prosjekt_id: DbId) -> AppResult<()> {
    ProsjektRepo::find_by_id(&state.pool, bedrift_id, prosjekt_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prosjekt",
            id: prosjekt_id,
        }))?;
    Ok(())
}

async fn ensure_assignable(state: &AppState, bedrift_id: DbId, user_id: DbId) -> AppResult<()> {
    if !UserRepo::is_active_member(&state.pool, bedrift_id, user_id).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "User {user_id} is not an active member of the company"
        ))));
    }
    Ok(())
}

fn publish_assigned(state: &AppState, actor_id: DbId, oppgave: &Oppgave) {
    state.publish(
        PlatformEvent::new(EVENT_OPPGAVE_ASSIGNED)
            .with_bedrift(oppgave.bedrift_id)
            .with_source(ENTITY_OPPGAVE, oppgave.id)
            .with_actor(actor_id)
            .with_payload(serde_json::json!({
                "title": oppgave.title,
                "prosjekt_id": oppgave.prosjekt_id,
                "assigned_user_id": oppgave.assigned_user_id,
            })),
    );
}
