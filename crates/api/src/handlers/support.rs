//! Handlers for platform support staff (`/support`).
//!
//! Support staff manage companies across tenants. Every change they make
//! to a company is also written to the support log.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::bedrift::normalize_orgnummer;
use hms_core::error::CoreError;
use hms_core::events::{ENTITY_BEDRIFT, EVENT_BEDRIFT_CREATED};
use hms_core::roles::ROLE_ADMIN;
use hms_core::types::DbId;
use hms_db::models::bedrift::{Bedrift, BedriftSummary, CreateBedrift, UpdateBedrift};
use hms_db::models::support_logg::{CreateSupportLogg, SupportLogg};
use hms_db::models::user::{CreateUser, UserResponse};
use hms_db::repositories::{BedriftRepo, SupportLoggRepo};
use hms_events::{OutgoingEmail, PlatformEvent};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{generate_temporary_password, hash_password};
use crate::error::{AppError, AppResult};
use crate::mail;
use crate::middleware::rbac::RequireSupport;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// The first administrator of a new company.
#[derive(Debug, Deserialize, Validate)]
pub struct NewAdmin {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
}

/// Request body for `POST /support/bedrifter`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBedriftRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub orgnummer: String,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(nested)]
    pub admin: NewAdmin,
}

/// Response for `POST /support/bedrifter`.
#[derive(Debug, Serialize)]
pub struct CreatedBedriftResponse {
    pub bedrift: Bedrift,
    pub admin: UserResponse,
    /// Present only when the welcome email could not be sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

/// Query parameters for `GET /support/logg`.
#[derive(Debug, Deserialize)]
pub struct LoggQuery {
    pub bedrift_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/support/bedrifter
pub async fn list_bedrifter(
    State(state): State<AppState>,
    RequireSupport(_support): RequireSupport,
) -> AppResult<Json<DataResponse<Vec<BedriftSummary>>>> {
    let data = BedriftRepo::list_summaries(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/support/bedrifter
///
/// Create a company together with its first admin in one transaction.
pub async fn create_bedrift(
    State(state): State<AppState>,
    RequireSupport(support): RequireSupport,
    Json(input): Json<CreateBedriftRequest>,
) -> AppResult<(StatusCode, Json<CreatedBedriftResponse>)> {
    input.validate()?;
    let orgnummer = normalize_orgnummer(&input.orgnummer)?;

    let password = generate_temporary_password();
    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let (bedrift, admin) = BedriftRepo::create_with_admin(
        &state.pool,
        &CreateBedrift {
            name: input.name,
            orgnummer,
            address: input.address,
            postal_code: input.postal_code,
            city: input.city,
        },
        &CreateUser {
            bedrift_id: 0,
            first_name: input.admin.first_name,
            last_name: input.admin.last_name,
            email: input.admin.email.trim().to_string(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
            position: None,
            phone: None,
        },
        support.user_id,
        |bedrift, admin| CreateSupportLogg {
            bedrift_id: bedrift.id,
            action: "bedrift_opprettet".into(),
            description: format!(
                "Bedrift {} opprettet med administrator {}",
                bedrift.name, admin.email
            ),
            metadata: Some(serde_json::json!({ "admin_user_id": admin.id })),
        },
    )
    .await?;

    tracing::info!(bedrift_id = bedrift.id, admin_id = admin.id, "Company created");
    state.publish(
        PlatformEvent::new(EVENT_BEDRIFT_CREATED)
            .with_bedrift(bedrift.id)
            .with_source(ENTITY_BEDRIFT, bedrift.id)
            .with_actor(support.user_id)
            .with_payload(serde_json::json!({ "name": bedrift.name, "orgnummer": bedrift.orgnummer })),
    );

    let email = OutgoingEmail::welcome(
        &admin.email,
        &admin.full_name(),
        &bedrift.name,
        &password,
        &state.config.app_base_url,
    );
    let temporary_password = (!mail::deliver(&state, email).await).then_some(password);

    Ok((
        StatusCode::CREATED,
        Json(CreatedBedriftResponse {
            admin: UserResponse::from(&admin),
            bedrift,
            temporary_password,
        }),
    ))
}

/// PUT /api/v1/support/bedrifter/{id}
///
/// Update any company, including activation.
pub async fn update_bedrift(
    State(state): State<AppState>,
    RequireSupport(support): RequireSupport,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBedrift>,
) -> AppResult<Json<Bedrift>> {
    input.validate()?;

    let action = match input.is_active {
        Some(true) => "bedrift_aktivert",
        Some(false) => "bedrift_deaktivert",
        None => "bedrift_oppdatert",
    };
    let metadata = serde_json::to_value(UpdateSummary::from(&input)).ok();

    let bedrift = BedriftRepo::update_logged(&state.pool, id, &input, support.user_id, |b| {
        CreateSupportLogg {
            bedrift_id: b.id,
            action: action.into(),
            description: format!("Bedrift {} oppdatert", b.name),
            metadata,
        }
    })
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Bedrift",
        id,
    }))?;

    Ok(Json(bedrift))
}

/// GET /api/v1/support/logg
pub async fn list_logg(
    State(state): State<AppState>,
    RequireSupport(_support): RequireSupport,
    Query(params): Query<LoggQuery>,
) -> AppResult<Json<DataResponse<Vec<SupportLogg>>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let data = SupportLoggRepo::list(&state.pool, params.bedrift_id, limit, offset).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/support/logg
pub async fn create_logg(
    State(state): State<AppState>,
    RequireSupport(support): RequireSupport,
    Json(input): Json<CreateSupportLogg>,
) -> AppResult<(StatusCode, Json<SupportLogg>)> {
    input.validate()?;
    if BedriftRepo::find_by_id(&state.pool, input.bedrift_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Bedrift",
            id: input.bedrift_id,
        }));
    }
    let entry = SupportLoggRepo::create(&state.pool, support.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Changed fields recorded as support log metadata.
#[derive(Serialize)]
struct UpdateSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    postal_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

impl<'a> From<&'a UpdateBedrift> for UpdateSummary<'a> {
    fn from(input: &'a UpdateBedrift) -> Self {
        Self {
            name: input.name.as_deref(),
            address: input.address.as_deref(),
            postal_code: input.postal_code.as_deref(),
            city: input.city.as_deref(),
            is_active: input.is_active,
        }
    }
}
