//! Route definitions for the `/oppgaver` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::{filer, oppgave};
use crate::state::AppState;

/// Routes mounted at `/oppgaver`.
///
/// ```text
/// GET    /mine          -> list_mine
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update (prosjektleder+)
/// DELETE /{id}          -> delete (prosjektleder+)
/// PATCH  /{id}/status   -> update_status (assignee or prosjektleder+)
/// GET    /{id}/filer    -> filer::list_for_oppgave
/// POST   /{id}/filer    -> filer::upload (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(oppgave::list_mine))
        .route(
            "/{id}",
            get(oppgave::get_by_id)
                .put(oppgave::update)
                .delete(oppgave::delete),
        )
        .route("/{id}/status", patch(oppgave::update_status))
        .route(
            "/{id}/filer",
            get(filer::list_for_oppgave).post(filer::upload),
        )
}
