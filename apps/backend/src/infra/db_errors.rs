//! SeaORM -> DomainError translation.
//!
//! Adapters return `sea_orm::DbErr`; repos convert it here so that services only
//! ever see `DomainError`. Raw driver messages are logged redacted and never reach
//! the client.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Prefix an adapter uses in `DbErr::Custom` when a guarded update matched no row.
pub const OPTIMISTIC_LOCK_PREFIX: &str = "OPTIMISTIC_LOCK:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// `table.column` out of SQLite's "UNIQUE constraint failed: table.column[, ...]".
fn extract_sqlite_table_column(error_msg: &str) -> Option<&str> {
    const MARKER: &str = "UNIQUE constraint failed: ";
    let start = error_msg.find(MARKER)? + MARKER.len();
    error_msg[start..]
        .split(|c: char| c.is_whitespace() || c == ',' || c == '"')
        .next()
        .filter(|s| !s.is_empty())
}

fn map_sqlite_table_column_to_conflict(table_column: &str) -> Option<(ConflictKind, &'static str)> {
    match table_column {
        "user_credentials.email" => Some((ConflictKind::UniqueEmail, "Email already registered")),
        "user_credentials.provider_sub" => Some((
            ConflictKind::ProviderSubMismatch,
            "Identity already linked to another user",
        )),
        _ => None,
    }
}

fn map_postgres_constraint_to_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    if error_msg.contains("user_credentials_email_key") {
        return Some((ConflictKind::UniqueEmail, "Email already registered"));
    }
    if error_msg.contains("user_credentials_provider_sub_key") {
        return Some((
            ConflictKind::ProviderSubMismatch,
            "Identity already linked to another user",
        ));
    }
    None
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(
                NotFoundKind::Other(what.clone()),
                "Record not found",
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(OPTIMISTIC_LOCK_PREFIX) => {
            let detail = msg.trim_start_matches(OPTIMISTIC_LOCK_PREFIX).trim();
            warn!(trace_id = %trace_id, detail, "Optimistic lock conflict detected");
            return DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Resource was modified concurrently; refresh and retry",
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with("DATA_CORRUPTION:") => {
            error!(trace_id = %trace_id, raw_error = %Redacted(msg), "Stored data failed to decode");
            return DomainError::infra(InfraErrorKind::DataCorruption, "Stored data is invalid");
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unique constraint violation");

        if let Some(table_column) = extract_sqlite_table_column(&error_msg) {
            if let Some((kind, detail)) = map_sqlite_table_column_to_conflict(table_column) {
                return DomainError::conflict(kind, detail);
            }
        }
        if let Some((kind, detail)) = map_postgres_constraint_to_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }

        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Foreign key constraint violation");
        return DomainError::validation_other("Referenced record does not exist");
    }

    if mentions_sqlstate(&error_msg, "23514") || error_msg.contains("CHECK constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Check constraint violation");
        return DomainError::validation_other("Check constraint violation");
    }

    if error_msg.contains("timeout")
        || error_msg.contains("timed out")
        || error_msg.contains("database is locked")
    {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}
