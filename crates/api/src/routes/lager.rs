//! Route definitions for the `/lager` resource (warehouse stock).

use axum::routing::get;
use axum::Router;

use crate::handlers::lager;
use crate::state::AppState;

/// Routes mounted at `/lager`.
///
/// ```text
/// GET    /                  -> list (?low_stock=)
/// POST   /                  -> create (leder+)
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update (leder+)
/// DELETE /{id}              -> delete (leder+)
/// GET    /{id}/bevegelser   -> list_movements
/// POST   /{id}/bevegelser   -> record_movement
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lager::list).post(lager::create))
        .route(
            "/{id}",
            get(lager::get_by_id).put(lager::update).delete(lager::delete),
        )
        .route(
            "/{id}/bevegelser",
            get(lager::list_movements).post(lager::record_movement),
        )
}
