use std::env;
use std::env::VarError;

use bazaar_backend::config::db::{DbKind, RuntimeEnv};
use bazaar_backend::infra::state::{build_state, StateBuilder};
use bazaar_backend::state::app_state::AppState;
use bazaar_backend::AppError;

/// `BAZAAR_TEST_DB_KIND` selects the backend; in-memory SQLite by default.
pub fn resolve_test_db_kind() -> Result<DbKind, AppError> {
    match env::var("BAZAAR_TEST_DB_KIND") {
        Ok(raw) => raw
            .parse::<DbKind>()
            .map_err(|e| AppError::config(format!("BAZAAR_TEST_DB_KIND: {e}"))),
        Err(VarError::NotPresent) => Ok(DbKind::SqliteMemory),
        Err(e) => Err(AppError::config(format!("failed to read BAZAAR_TEST_DB_KIND: {e}"))),
    }
}

pub fn test_state_builder() -> Result<StateBuilder, AppError> {
    Ok(build_state()
        .with_env(RuntimeEnv::Test)
        .with_db(resolve_test_db_kind()?))
}

pub async fn build_test_state() -> Result<AppState, AppError> {
    test_state_builder()?.build().await
}
