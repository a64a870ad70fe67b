//! Role-based access control (RBAC) extractors.
//!
//! Roles are ranked `bruker < prosjektleder < leder < admin < support`. Each
//! extractor wraps [`AuthUser`] and rejects requests whose role ranks below
//! its minimum with 403 Forbidden.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hms_core::error::CoreError;
use hms_core::roles::{ROLE_ADMIN, ROLE_LEDER, ROLE_PROSJEKTLEDER, ROLE_SUPPORT};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    required: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.has_role(required) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{required}' or higher required"
        ))));
    }
    Ok(user)
}

/// Requires `prosjektleder` or higher.
///
/// ```ignore
/// async fn plan(RequireProsjektleder(user): RequireProsjektleder) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireProsjektleder(pub AuthUser);

impl FromRequestParts<AppState> for RequireProsjektleder {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_PROSJEKTLEDER)
            .await
            .map(RequireProsjektleder)
    }
}

/// Requires `leder` or higher.
pub struct RequireLeder(pub AuthUser);

impl FromRequestParts<AppState> for RequireLeder {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_LEDER).await.map(RequireLeder)
    }
}

/// Requires `admin` or higher (company administrators and support staff).
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_ADMIN).await.map(RequireAdmin)
    }
}

/// Requires platform `support` staff.
pub struct RequireSupport(pub AuthUser);

impl FromRequestParts<AppState> for RequireSupport {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_SUPPORT)
            .await
            .map(RequireSupport)
    }
}
