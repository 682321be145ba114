use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::catalog::cities::CityDirectory;

/// Shared resources handed to every handler through `web::Data`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Absent only in tests that never touch persistence
    pub db: Option<DatabaseConnection>,
    pub security: SecurityConfig,
    pub cities: Arc<CityDirectory>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, security: SecurityConfig, cities: Arc<CityDirectory>) -> Self {
        Self {
            db: Some(db),
            security,
            cities,
        }
    }

    pub fn new_without_db(security: SecurityConfig, cities: Arc<CityDirectory>) -> Self {
        Self {
            db: None,
            security,
            cities,
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }
}
