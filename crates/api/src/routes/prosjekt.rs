//! Route definitions for the `/prosjekter` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{oppgave, prosjekt};
use crate::state::AppState;

/// Routes mounted at `/prosjekter`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create (prosjektleder+)
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update (prosjektleder+)
/// DELETE /{id}             -> delete (leder+)
/// GET    /{id}/oppgaver    -> oppgave::list_for_prosjekt
/// POST   /{id}/oppgaver    -> oppgave::create (prosjektleder+)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(prosjekt::list).post(prosjekt::create))
        .route(
            "/{id}",
            get(prosjekt::get_by_id)
                .put(prosjekt::update)
                .delete(prosjekt::delete),
        )
        .route(
            "/{id}/oppgaver",
            get(oppgave::list_for_prosjekt).post(oppgave::create),
        )
}
