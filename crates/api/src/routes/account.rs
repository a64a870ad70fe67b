//! Route definitions for the caller's own account (`/me`).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// GET  /          -> get_me
/// PUT  /          -> update_me
/// POST /password  -> change_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(account::get_me).put(account::update_me))
        .route("/password", post(account::change_password))
}
