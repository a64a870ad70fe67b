//! Outgoing email helper for handlers.

use hms_events::OutgoingEmail;

use crate::state::AppState;

/// Send `email` through the configured mailer.
///
/// Returns `false` when no mailer is configured or delivery failed; the
/// caller decides whether that matters. Failures are logged here.
pub async fn deliver(state: &AppState, email: OutgoingEmail) -> bool {
    let Some(mailer) = state.mailer.as_ref() else {
        tracing::debug!(to = %email.to, subject = %email.subject, "Email not configured, skipping");
        return false;
    };

    match mailer.send(&email).await {
        Ok(()) => {
            tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, to = %email.to, "Email delivery failed");
            false
        }
    }
}
