//! Route definitions for the `/timer` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::timer;
use crate::state::AppState;

/// Routes mounted at `/timer`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /summary   -> summary (prosjektleder+)
/// GET    /export    -> export (CSV)
/// PUT    /{id}      -> update (owner or leder+)
/// DELETE /{id}      -> delete (owner or leder+)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(timer::list).post(timer::create))
        .route("/summary", get(timer::summary))
        .route("/export", get(timer::export))
        .route("/{id}", put(timer::update).delete(timer::delete))
}
