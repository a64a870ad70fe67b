//! Route definitions for task attachments addressed by their own id.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::filer;
use crate::state::AppState;

/// Routes mounted at `/filer`.
///
/// ```text
/// GET    /{id}/download  -> download
/// DELETE /{id}           -> delete (uploader or prosjektleder+)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/download", get(filer::download))
        .route("/{id}", delete(filer::delete))
}
