use tracing::warn;

use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Log a rejected login attempt.
pub fn login_failed(reason: &str, email: Option<&str>) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        email = %Redacted(email.unwrap_or("")),
        reason,
        "Authentication failure"
    );
}

/// Log a bearer token that failed verification.
pub fn token_rejected(reason: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_TOKEN_REJECTED",
        %trace_id,
        reason,
        "Bearer token rejected"
    );
}

/// Log an authenticated user touching an ad they do not own.
pub fn ownership_denied(user_id: i64, ad_id: i64) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_OWNERSHIP_DENIED",
        %trace_id,
        user_id,
        ad_id,
        "Mutation attempted on another seller's ad"
    );
}
