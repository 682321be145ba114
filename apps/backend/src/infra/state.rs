use std::sync::Arc;

use db_infra::{build_pool, orchestrate_migration, orchestrate_migration_internal};
use migration::MigrationCommand;
use tracing::info;

use crate::catalog::cities::CityDirectory;
use crate::config::db::{DbKind, RuntimeEnv};
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for `AppState`, shared by `main` and the test harness.
pub struct StateBuilder {
    env: RuntimeEnv,
    db_kind: Option<DbKind>,
    security_config: SecurityConfig,
    cities: Option<Arc<CityDirectory>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            env: RuntimeEnv::Test,
            db_kind: None,
            security_config: SecurityConfig::default(),
            cities: None,
        }
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_db(mut self, db_kind: DbKind) -> Self {
        self.db_kind = Some(db_kind);
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_cities(mut self, cities: Arc<CityDirectory>) -> Self {
        self.cities = Some(cities);
        self
    }

    /// Connect, migrate to latest and assemble the state.
    pub async fn build(self) -> Result<AppState, AppError> {
        let cities = match self.cities {
            Some(cities) => cities,
            None => Arc::new(CityDirectory::load_embedded()?),
        };

        let Some(db_kind) = self.db_kind else {
            return Ok(AppState::new_without_db(self.security_config, cities));
        };

        let conn = match db_kind {
            // Only the runtime connection can see the in-memory schema.
            DbKind::SqliteMemory => {
                let pool = build_pool(self.env, db_kind).await?;
                orchestrate_migration_internal(&pool, self.env, db_kind, MigrationCommand::Up)
                    .await?;
                pool
            }
            DbKind::Postgres | DbKind::SqliteFile => {
                orchestrate_migration(self.env, db_kind, MigrationCommand::Up).await?;
                build_pool(self.env, db_kind).await?
            }
        };

        info!(env = ?self.env, db_kind = ?db_kind, cities = cities.len(), "state=ready");
        Ok(AppState::new(conn, self.security_config, cities))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
