//! Handlers for warehouse stock (`/lager`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::error::CoreError;
use hms_core::events::{ENTITY_LAGER_PRODUKT, EVENT_LAGER_LOW_STOCK};
use hms_core::lager::MOVEMENT_JUSTERING;
use hms_core::roles::ROLE_LEDER;
use hms_core::types::DbId;
use hms_db::models::lager::{
    CreateLagerBevegelse, CreateLagerProdukt, LagerBevegelse, LagerProdukt, MovementResult,
    UpdateLagerProdukt,
};
use hms_db::repositories::{LagerRepo, ProsjektRepo};
use hms_events::PlatformEvent;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireLeder;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /lager`.
#[derive(Debug, Default, Deserialize)]
pub struct LagerListQuery {
    #[serde(default)]
    pub low_stock: bool,
}

/// GET /api/v1/lager
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<LagerListQuery>,
) -> AppResult<Json<DataResponse<Vec<LagerProdukt>>>> {
    let data = LagerRepo::list(&state.pool, auth.bedrift_id, params.low_stock).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/lager/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<LagerProdukt>> {
    Ok(Json(find(&state, auth.bedrift_id, id).await?))
}

/// POST /api/v1/lager
pub async fn create(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Json(input): Json<CreateLagerProdukt>,
) -> AppResult<(StatusCode, Json<LagerProdukt>)> {
    input.validate()?;
    let produkt = LagerRepo::create(&state.pool, user.bedrift_id, &input).await?;
    Ok((StatusCode::CREATED, Json(produkt)))
}

/// PUT /api/v1/lager/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLagerProdukt>,
) -> AppResult<Json<LagerProdukt>> {
    input.validate()?;
    let produkt = LagerRepo::update(&state.pool, user.bedrift_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LagerProdukt",
            id,
        }))?;
    Ok(Json(produkt))
}

/// DELETE /api/v1/lager/{id}
///
/// Removes the product together with its movement history.
pub async fn delete(
    State(state): State<AppState>,
    RequireLeder(user): RequireLeder,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if LagerRepo::delete_cascade(&state.pool, user.bedrift_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "LagerProdukt",
            id,
        }))
    }
}

/// POST /api/v1/lager/{id}/bevegelser
///
/// Withdraw, return or (leder+) adjust stock. Publishes `lager.low_stock`
/// when the movement takes the product below its minimum.
pub async fn record_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateLagerBevegelse>,
) -> AppResult<(StatusCode, Json<MovementResult>)> {
    input.validate()?;
    if input.movement_type == MOVEMENT_JUSTERING && !auth.has_role(ROLE_LEDER) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Stock adjustments require role 'leder' or higher".into(),
        )));
    }
    if let Some(prosjekt_id) = input.prosjekt_id {
        if ProsjektRepo::find_by_id(&state.pool, auth.bedrift_id, prosjekt_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Prosjekt {prosjekt_id} does not exist"
            ))));
        }
    }

    let result = LagerRepo::record_movement(&state.pool, auth.bedrift_id, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LagerProdukt",
            id,
        }))?;

    if result.crossed_below_minimum {
        tracing::info!(
            produkt_id = id,
            quantity = result.produkt.quantity,
            min_quantity = result.produkt.min_quantity,
            "Stock fell below minimum"
        );
        state.publish(
            PlatformEvent::new(EVENT_LAGER_LOW_STOCK)
                .with_bedrift(auth.bedrift_id)
                .with_source(ENTITY_LAGER_PRODUKT, id)
                .with_actor(auth.user_id)
                .with_payload(serde_json::json!({
                    "name": result.produkt.name,
                    "quantity": result.produkt.quantity,
                    "min_quantity": result.produkt.min_quantity,
                })),
        );
    }

    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/v1/lager/{id}/bevegelser
pub async fn list_movements(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<LagerBevegelse>>>> {
    find(&state, auth.bedrift_id, id).await?;
    let (limit, offset) = page.resolve();
    let data = LagerRepo::list_movements(&state.pool, auth.bedrift_id, id, limit, offset).await?;
    Ok(Json(DataResponse { data }))
}

async fn find(state: &AppState, bedrift_id: DbId, id: DbId) -> AppResult<LagerProdukt> {
    LagerRepo::find_by_id(&state.pool, bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "LagerProdukt",
            id,
        }))
}
