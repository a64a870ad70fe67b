//! Route definitions for platform support staff.
//!
//! Every endpoint requires the `support` role.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::support;
use crate::state::AppState;

/// Routes mounted at `/support`.
///
/// ```text
/// GET  /bedrifter       -> list_bedrifter
/// POST /bedrifter       -> create_bedrift
/// PUT  /bedrifter/{id}  -> update_bedrift
/// GET  /logg            -> list_logg
/// POST /logg            -> create_logg
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/bedrifter",
            get(support::list_bedrifter).post(support::create_bedrift),
        )
        .route("/bedrifter/{id}", put(support::update_bedrift))
        .route("/logg", get(support::list_logg).post(support::create_logg))
}
