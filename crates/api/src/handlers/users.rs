//! Handlers for company user administration (`/admin/users`).
//!
//! All handlers require the `admin` role via [`RequireAdmin`] and act on the
//! admin's own company only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use hms_core::error::CoreError;
use hms_core::events::{ENTITY_USER, EVENT_USER_CREATED};
use hms_core::roles::{can_assign_role, is_valid_role, ALL_ROLES};
use hms_core::types::DbId;
use hms_db::models::role::Role;
use hms_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use hms_db::repositories::{BedriftRepo, RoleRepo, SessionRepo, UserRepo};
use hms_events::{OutgoingEmail, PlatformEvent};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{
    generate_temporary_password, hash_password, validate_password_strength, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::mail;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub role: String,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    /// When omitted a temporary password is generated and emailed.
    pub password: Option<String>,
}

/// Response for a newly created account.
///
/// `temporary_password` is only present when a generated password could
/// not be emailed; it is shown once and never stored in plain text.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct AdminResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/roles
///
/// The roles the caller may hand out.
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    let assignable: Vec<&str> = ALL_ROLES
        .iter()
        .copied()
        .filter(|role| can_assign_role(&admin.role, role))
        .collect();
    let data = RoleRepo::list_named(&state.pool, &assignable).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_for_bedrift(&state.pool, admin.bedrift_id).await?;
    let data = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/users
///
/// Create an employee in the admin's company. Returns 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<CreatedUserResponse>)> {
    input.validate()?;
    check_assignable_role(&admin.role, &input.role)?;

    let generated = input.password.is_none();
    let password = match input.password {
        Some(pw) => {
            validate_password_strength(&pw, MIN_PASSWORD_LENGTH)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
            pw
        }
        None => generate_temporary_password(),
    };
    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            bedrift_id: admin.bedrift_id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email.trim().to_string(),
            password_hash,
            role: input.role,
            position: input.position,
            phone: input.phone,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, bedrift_id = user.bedrift_id, role = %user.role, "User created");
    state.publish(
        PlatformEvent::new(EVENT_USER_CREATED)
            .with_bedrift(user.bedrift_id)
            .with_source(ENTITY_USER, user.id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({ "email": user.email, "role": user.role })),
    );

    let temporary_password = if generated {
        let bedrift_name = BedriftRepo::find_by_id(&state.pool, user.bedrift_id)
            .await?
            .map(|b| b.name)
            .unwrap_or_default();
        let email = OutgoingEmail::welcome(
            &user.email,
            &user.full_name(),
            &bedrift_name,
            &password,
            &state.config.app_base_url,
        );
        (!mail::deliver(&state, email).await).then_some(password)
    } else {
        None
    };

    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            user: UserResponse::from(&user),
            temporary_password,
        }),
    ))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_in_bedrift(&state.pool, admin.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update profile fields, role or active flag (not password).
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    input.validate()?;
    if let Some(role) = input.role.as_deref() {
        check_assignable_role(&admin.role, role)?;
        if id == admin.user_id && role != admin.role {
            return Err(AppError::BadRequest("You cannot change your own role".into()));
        }
    }
    if id == admin.user_id && input.is_active == Some(false) {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }
    find_manageable(&state, &admin, id).await?;

    let user = UserRepo::update(&state.pool, admin.bedrift_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if !user.is_active {
        SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    }
    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user and revoke their sessions. Returns 204 No Content.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".into(),
        ));
    }
    find_manageable(&state, &admin, id).await?;

    if !UserRepo::deactivate(&state.pool, admin.bedrift_id, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, revoked, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Admin-initiated password reset for a user of the same company.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AdminResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    find_manageable(&state, &admin, id).await?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, id, &hashed).await?;
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a user of the admin's company whose current role the admin may
/// hand out. Admins cannot touch support accounts.
async fn find_manageable(state: &AppState, admin: &AuthUser, id: DbId) -> AppResult<User> {
    let target = UserRepo::find_in_bedrift(&state.pool, admin.bedrift_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    if !can_assign_role(&admin.role, &target.role) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' cannot manage a '{}' account",
            admin.role, target.role
        ))));
    }
    Ok(target)
}

fn check_assignable_role(actor_role: &str, role: &str) -> AppResult<()> {
    if !is_valid_role(role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role '{role}'"
        ))));
    }
    if !can_assign_role(actor_role, role) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{actor_role}' cannot assign role '{role}'"
        ))));
    }
    Ok(())
}
