pub mod account;
pub mod admin;
pub mod auth;
pub mod bedrift;
pub mod filer;
pub mod health;
pub mod lager;
pub mod notification;
pub mod oppgave;
pub mod prosjekt;
pub mod skjema;
pub mod stoffkartotek;
pub mod support;
pub mod timer;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (?token=)
///
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
/// /auth/forgot-password                request reset link (public)
/// /auth/reset-password                 redeem reset token (public)
///
/// /me                                  own profile, password change
/// /admin/users, /admin/roles           company user management (admin)
/// /bedrift                             own company, colleagues
/// /support                             companies and support log (support)
///
/// /prosjekter                          projects, nested task lists
/// /oppgaver                            tasks, status moves, attachments
/// /filer                               attachment download/delete
/// /timer                               time entries, summary, CSV export
/// /skjemaer                            avvik/endring/sja/risikovurdering
/// /stoffkartotek                       chemical register, datasheets
/// /lager                               stock and movements
///
/// /notifications                       in-app notifications
/// /activity                            company event feed
/// /dashboard                           per-user summary
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/me", account::router())
        .nest("/admin", admin::router())
        .nest("/bedrift", bedrift::router())
        .nest("/support", support::router())
        .nest("/prosjekter", prosjekt::router())
        .nest("/oppgaver", oppgave::router())
        .nest("/filer", filer::router())
        .nest("/timer", timer::router())
        .nest("/skjemaer", skjema::router())
        .nest("/stoffkartotek", stoffkartotek::router())
        .nest("/lager", lager::router())
        .nest("/notifications", notification::router())
        .route("/activity", get(handlers::activity::list))
        .route("/dashboard", get(handlers::dashboard::get))
}
