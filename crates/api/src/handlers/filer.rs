//! Handlers for task attachments (`/oppgaver/{id}/filer`, `/filer`).

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::error::CoreError;
use hms_core::files::{sanitize_file_name, task_file_key};
use hms_core::roles::ROLE_PROSJEKTLEDER;
use hms_core::types::DbId;
use hms_db::models::fil::{CreateOppgaveFil, OppgaveFil};
use hms_db::repositories::FilRepo;
use hms_storage::unique_prefix;

use crate::error::{AppError, AppResult};
use crate::handlers::oppgave::find_oppgave;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, FileResponse};
use crate::state::AppState;
use crate::upload::read_upload;

/// Fallback content type for uploads that do not declare one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// GET /api/v1/oppgaver/{id}/filer
pub async fn list_for_oppgave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(oppgave_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<OppgaveFil>>>> {
    find_oppgave(&state, auth.bedrift_id, oppgave_id).await?;
    let data = FilRepo::list_for_oppgave(&state.pool, auth.bedrift_id, oppgave_id).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/oppgaver/{id}/filer
///
/// Multipart upload (field `file`). The object is written before the row;
/// if the insert fails the object is removed again.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(oppgave_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<OppgaveFil>)> {
    find_oppgave(&state, auth.bedrift_id, oppgave_id).await?;

    let upload = read_upload(&mut multipart, state.config.max_upload_bytes).await?;
    let file_name = sanitize_file_name(&upload.file_name);
    let content_type = upload
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let size_bytes = upload.bytes.len() as i64;

    let key = task_file_key(auth.bedrift_id, oppgave_id, &unique_prefix(), &file_name);
    state
        .object_store
        .put(&key, upload.bytes, &content_type)
        .await?;

    let created = FilRepo::create(
        &state.pool,
        &CreateOppgaveFil {
            bedrift_id: auth.bedrift_id,
            oppgave_id,
            object_key: key.clone(),
            file_name,
            content_type,
            size_bytes,
            uploaded_by: auth.user_id,
        },
    )
    .await;

    match created {
        Ok(fil) => {
            tracing::info!(fil_id = fil.id, oppgave_id, size_bytes, "Attachment uploaded");
            Ok((StatusCode::CREATED, Json(fil)))
        }
        Err(e) => {
            state.remove_objects(&[key]).await;
            Err(e.into())
        }
    }
}

/// GET /api/v1/filer/{id}/download
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<FileResponse> {
    let fil = FilRepo::find_by_id(&state.pool, auth.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Fil", id }))?;

    let object = state.object_store.get(&fil.object_key).await?;
    Ok(FileResponse {
        file_name: fil.file_name,
        content_type: fil.content_type,
        bytes: object.bytes,
    })
}

/// DELETE /api/v1/filer/{id}
///
/// Allowed for the uploader and for prosjektleder or higher.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let fil = FilRepo::find_by_id(&state.pool, auth.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Fil", id }))?;

    if fil.uploaded_by != Some(auth.user_id) && !auth.has_role(ROLE_PROSJEKTLEDER) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the uploader or a project manager can delete this file".into(),
        )));
    }

    let key = FilRepo::delete(&state.pool, auth.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Fil", id }))?;
    state.remove_objects(&[key]).await;

    Ok(StatusCode::NO_CONTENT)
}
