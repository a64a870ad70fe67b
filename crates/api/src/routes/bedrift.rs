//! Route definitions for the caller's own company.

use axum::routing::get;
use axum::Router;

use crate::handlers::bedrift;
use crate::state::AppState;

/// Routes mounted at `/bedrift`.
///
/// ```text
/// GET /          -> get_own
/// PUT /          -> update_own (admin)
/// GET /ansatte   -> list_colleagues
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(bedrift::get_own).put(bedrift::update_own))
        .route("/ansatte", get(bedrift::list_colleagues))
}
