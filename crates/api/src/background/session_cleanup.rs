//! Periodic purge of expired sessions and password reset tokens.

use std::time::Duration;

use hms_db::repositories::{PasswordResetRepo, SessionRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the cleanup loop every `interval` until `cancel` is triggered.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Session cleanup job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = ticker.tick() => {
                purge(&pool).await;
            }
        }
    }
}

async fn purge(pool: &PgPool) {
    match SessionRepo::cleanup_expired(pool).await {
        Ok(0) => tracing::debug!("Session cleanup: no rows to purge"),
        Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged expired sessions"),
        Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
    }

    match PasswordResetRepo::cleanup_expired(pool).await {
        Ok(0) => {}
        Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged password reset tokens"),
        Err(e) => tracing::error!(error = %e, "Password reset token cleanup failed"),
    }
}
