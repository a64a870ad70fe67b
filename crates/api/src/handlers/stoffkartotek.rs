//! Handlers for the chemical register (`/stoffkartotek`).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::csv::build_csv;
use hms_core::error::CoreError;
use hms_core::files::{datasheet_key, DATASHEET_CONTENT_TYPE};
use hms_core::search::contains_pattern;
use hms_core::stoffkartotek::{normalize_symbols, validate_cas_number};
use hms_core::types::DbId;
use hms_db::models::stoffkartotek::{CreateStoffkartotek, Stoffkartotek, UpdateStoffkartotek};
use hms_db::repositories::StoffkartotekRepo;
use hms_storage::unique_prefix;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireLeder;
use crate::response::{CsvResponse, DataResponse, FileResponse};
use crate::state::AppState;
use crate::upload::read_upload;

const EXPORT_HEADER: &[&str] = &[
    "product_name",
    "manufacturer",
    "cas_number",
    "usage_area",
    "storage_location",
    "hazard_symbols",
    "datablad",
];

/// Every PDF starts with this signature.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Query parameters for `GET /stoffkartotek`.
#[derive(Debug, Default, Deserialize)]
pub struct StoffkartotekQuery {
    pub q: Option<String>,
}

/// GET /api/v1/stoffkartotek
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<StoffkartotekQuery>,
) -> AppResult<Json<DataResponse<Vec<Stoffkartotek>>>> {
    let pattern = contains_pattern(params.q.as_deref());
    let data = StoffkartotekRepo::list(&state.pool, auth.bedrift_id, pattern.as_deref()).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/stoffkartotek/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Stoffkartotek>> {
    Ok(Json(find(&state, auth.bedrift_id, id).await?))
}

/// POST /api/v1/stoffkartotek
pub async fn create(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Json(mut input): Json<CreateStoffkartotek>,
) -> AppResult<(StatusCode, Json<Stoffkartotek>)> {
    input.validate()?;
    input.cas_number = normalize_cas(input.cas_number.take())?;
    let symbols = normalize_symbols(&input.hazard_symbols)?;

    let stoff = StoffkartotekRepo::create(&state.pool, user.bedrift_id, &input, &symbols).await?;
    Ok((StatusCode::CREATED, Json(stoff)))
}

/// PUT /api/v1/stoffkartotek/{id}
///
/// `hazard_symbols`, when given, replaces the whole symbol set.
pub async fn update(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateStoffkartotek>,
) -> AppResult<Json<Stoffkartotek>> {
    input.validate()?;
    input.cas_number = normalize_cas(input.cas_number.take())?;
    let symbols = input
        .hazard_symbols
        .as_deref()
        .map(normalize_symbols)
        .transpose()?;

    let stoff = StoffkartotekRepo::update(
        &state.pool,
        user.bedrift_id,
        id,
        &input,
        symbols.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Stoffkartotek",
        id,
    }))?;
    Ok(Json(stoff))
}

/// DELETE /api/v1/stoffkartotek/{id}
///
/// Symbols and record go in one transaction; the datasheet object after.
pub async fn delete(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let datasheet = StoffkartotekRepo::delete_cascade(&state.pool, user.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Stoffkartotek",
            id,
        }))?;

    if let Some(key) = datasheet {
        state.remove_objects(&[key]).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/stoffkartotek/{id}/datablad
///
/// Upload a safety data sheet (PDF), replacing any previous one.
pub async fn upload_datasheet(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<Stoffkartotek>> {
    find(&state, user.bedrift_id, id).await?;

    let upload = read_upload(&mut multipart, state.config.max_upload_bytes).await?;
    if !upload.bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::BadRequest("Datasheet must be a PDF file".into()));
    }

    let key = datasheet_key(user.bedrift_id, id, &unique_prefix(), &upload.file_name);
    state
        .object_store
        .put(&key, upload.bytes, DATASHEET_CONTENT_TYPE)
        .await?;

    let previous = match StoffkartotekRepo::set_datasheet(&state.pool, user.bedrift_id, id, &key).await {
        Ok(Some(previous)) => previous,
        Ok(None) => {
            state.remove_objects(&[key]).await;
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Stoffkartotek",
                id,
            }));
        }
        Err(e) => {
            state.remove_objects(&[key]).await;
            return Err(e.into());
        }
    };
    if let Some(previous) = previous {
        state.remove_objects(&[previous]).await;
    }

    Ok(Json(find(&state, user.bedrift_id, id).await?))
}

/// GET /api/v1/stoffkartotek/{id}/datablad
pub async fn download_datasheet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<FileResponse> {
    let stoff = find(&state, auth.bedrift_id, id).await?;
    let key = stoff.datasheet_key.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Datablad",
        id,
    }))?;

    let object = state.object_store.get(&key).await?;
    Ok(FileResponse {
        file_name: format!("{}.pdf", stoff.product_name),
        content_type: DATASHEET_CONTENT_TYPE.to_string(),
        bytes: object.bytes,
    })
}

/// GET /api/v1/stoffkartotek/export
pub async fn export(State(state): State<AppState>, auth: AuthUser) -> AppResult<CsvResponse> {
    let products = StoffkartotekRepo::list(&state.pool, auth.bedrift_id, None).await?;

    let body = build_csv(
        EXPORT_HEADER,
        products.into_iter().map(|s| {
            let datablad = if s.has_datasheet() { "ja" } else { "nei" };
            vec![
                s.product_name,
                s.manufacturer.unwrap_or_default(),
                s.cas_number.unwrap_or_default(),
                s.usage_area.unwrap_or_default(),
                s.storage_location.unwrap_or_default(),
                s.hazard_symbols.join(";"),
                datablad.to_string(),
            ]
        }),
    );

    Ok(CsvResponse {
        file_name: "stoffkartotek.csv".into(),
        body,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find(state: &AppState, bedrift_id: DbId, id: DbId) -> AppResult<Stoffkartotek> {
    StoffkartotekRepo::find_by_id(&state.pool, bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Stoffkartotek",
            id,
        }))
}

/// Blank CAS numbers are treated as absent.
fn normalize_cas(cas: Option<String>) -> AppResult<Option<String>> {
    match cas.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(cas) => {
            validate_cas_number(cas)?;
            Ok(Some(cas.to_string()))
        }
    }
}
