//! Route definitions for the `/stoffkartotek` resource (chemical register).

use axum::routing::get;
use axum::Router;

use crate::handlers::stoffkartotek;
use crate::state::AppState;

/// Routes mounted at `/stoffkartotek`.
///
/// ```text
/// GET    /                -> list (?q=)
/// POST   /                -> create (leder+)
/// GET    /export          -> export (CSV)
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update (leder+)
/// DELETE /{id}            -> delete (leder+)
/// GET    /{id}/datablad   -> download_datasheet
/// POST   /{id}/datablad   -> upload_datasheet (leder+, PDF)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(stoffkartotek::list).post(stoffkartotek::create))
        .route("/export", get(stoffkartotek::export))
        .route(
            "/{id}",
            get(stoffkartotek::get_by_id)
                .put(stoffkartotek::update)
                .delete(stoffkartotek::delete),
        )
        .route(
            "/{id}/datablad",
            get(stoffkartotek::download_datasheet).post(stoffkartotek::upload_datasheet),
        )
}
