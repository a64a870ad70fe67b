//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac`] -- Minimum-role extractors (`RequireProsjektleder`, `RequireLeder`,
//!   `RequireAdmin`, `RequireSupport`).

pub mod auth;
pub mod rbac;
