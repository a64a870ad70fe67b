//! Route definitions for the `/skjemaer` resource (HMS forms).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::skjema;
use crate::state::AppState;

/// Routes mounted at `/skjemaer`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete (admin)
/// POST   /{id}/status   -> change_status (leder+)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(skjema::list).post(skjema::create))
        .route(
            "/{id}",
            get(skjema::get_by_id)
                .put(skjema::update)
                .delete(skjema::delete),
        )
        .route("/{id}/status", post(skjema::change_status))
}
