//! Database selection and connection-string construction.
//!
//! Everything here is driven by environment variables so the backend, the
//! migration CLI and the test harness all resolve the same database for the
//! same `(RuntimeEnv, DbKind, DbOwner)` triple.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sea_orm::DatabaseBackend;

use crate::error::DbInfraError;

/// Which deployment the process belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeEnv {
    Prod,
    /// Test databases are guarded: Postgres names must end in `_test`.
    Test,
}

/// Storage engine behind the repository layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl FromStr for DbKind {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DbKind::Postgres),
            "sqlite" | "sqlite-file" | "sqlite_file" => Ok(DbKind::SqliteFile),
            "sqlite-memory" | "sqlite_memory" | "memory" => Ok(DbKind::SqliteMemory),
            other => Err(DbInfraError::config(format!("unknown database kind '{other}'"))),
        }
    }
}

impl From<DbKind> for DatabaseBackend {
    fn from(kind: DbKind) -> Self {
        match kind {
            DbKind::Postgres => DatabaseBackend::Postgres,
            DbKind::SqliteFile | DbKind::SqliteMemory => DatabaseBackend::Sqlite,
        }
    }
}

/// Database role used for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOwner {
    /// Application-level access (DML only)
    App,
    /// Owner-level access (DDL, used for migrations)
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPurpose {
    Runtime,
    Migration,
}

/// Per-session settings applied after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub statement_timeout_ms: u64,
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub db_settings: DbSettings,
}

/// Read `var` as a [`DbKind`], falling back to `default` when unset.
pub fn db_kind_from_env(var: &str, default: DbKind) -> Result<DbKind, DbInfraError> {
    match env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw.parse(),
        _ => Ok(default),
    }
}

pub fn build_connection_settings(
    env: RuntimeEnv,
    db_kind: DbKind,
    purpose: PoolPurpose,
) -> Result<ConnectionSettings, DbInfraError> {
    // An in-memory database exists per connection, so the pool must be exactly one wide.
    let (max_connections, min_connections) = match (db_kind, purpose) {
        (DbKind::SqliteMemory, _) => (1, 1),
        (_, PoolPurpose::Migration) => (1, 1),
        (DbKind::SqliteFile, PoolPurpose::Runtime) => (4, 1),
        (DbKind::Postgres, PoolPurpose::Runtime) => match env {
            RuntimeEnv::Prod => (20, 2),
            RuntimeEnv::Test => (5, 1),
        },
    };

    let statement_timeout_ms = match purpose {
        PoolPurpose::Runtime => 10_000,
        PoolPurpose::Migration => 120_000,
    };

    Ok(ConnectionSettings {
        max_connections,
        min_connections,
        acquire_timeout: Duration::from_secs(5),
        db_settings: DbSettings {
            statement_timeout_ms,
            busy_timeout_ms: 5_000,
        },
    })
}

/// Session statements that realise [`DbSettings`] for the given engine.
pub fn build_session_statements(db_kind: DbKind, settings: &DbSettings) -> Vec<String> {
    match db_kind {
        DbKind::Postgres => vec![
            format!("SET statement_timeout = {}", settings.statement_timeout_ms),
            "SET TIME ZONE 'UTC'".to_string(),
        ],
        DbKind::SqliteFile | DbKind::SqliteMemory => vec![
            format!("PRAGMA busy_timeout = {}", settings.busy_timeout_ms),
            "PRAGMA foreign_keys = ON".to_string(),
        ],
    }
}

/// Build the connection string for the requested database.
pub fn make_conn_spec(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
) -> Result<String, DbInfraError> {
    match db_kind {
        DbKind::Postgres => {
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = pg_db_name(env)?;
            let (user, password) = credentials(owner)?;
            Ok(format!(
                "postgresql://{}:{}@{host}:{port}/{db_name}",
                utf8_percent_encode(&user, NON_ALPHANUMERIC),
                utf8_percent_encode(&password, NON_ALPHANUMERIC),
            ))
        }
        DbKind::SqliteFile => {
            let path = sqlite_file_path(env)?;
            Ok(format!("sqlite://{}?mode=rwc", path.display()))
        }
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

/// Reject combinations that would point a test run at a production database.
pub fn validate_db_config(env: RuntimeEnv, db_kind: DbKind) -> Result<(), DbInfraError> {
    match (env, db_kind) {
        (RuntimeEnv::Test, DbKind::Postgres) => pg_db_name(env).map(|_| ()),
        (RuntimeEnv::Prod, DbKind::SqliteMemory) => Err(DbInfraError::config(
            "in-memory SQLite is only allowed in the test environment",
        )),
        _ => Ok(()),
    }
}

pub fn sqlite_file_path(env: RuntimeEnv) -> Result<PathBuf, DbInfraError> {
    let dir = env::var("SQLITE_DB_DIR").unwrap_or_else(|_| "./data".to_string());
    let file = match env {
        RuntimeEnv::Prod => "bazaar.db",
        RuntimeEnv::Test => "bazaar_test.db",
    };
    Ok(PathBuf::from(dir).join(file))
}

/// Lock file guarding migrations of a file-backed SQLite database.
pub fn sqlite_lock_path(db_kind: DbKind, env: RuntimeEnv) -> Result<PathBuf, DbInfraError> {
    if db_kind != DbKind::SqliteFile {
        return Err(DbInfraError::config(format!(
            "lock path requested for non-file database kind {db_kind:?}"
        )));
    }
    let mut path = sqlite_file_path(env)?.into_os_string();
    path.push(".migrate.lock");
    Ok(PathBuf::from(path))
}

fn pg_db_name(env: RuntimeEnv) -> Result<String, DbInfraError> {
    match env {
        RuntimeEnv::Prod => must_var("PROD_DB"),
        RuntimeEnv::Test => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(DbInfraError::config(format!(
                    "Test environment requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
            Ok(db_name)
        }
    }
}

fn credentials(owner: DbOwner) -> Result<(String, String), DbInfraError> {
    match owner {
        DbOwner::App => Ok((must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?)),
        DbOwner::Owner => Ok((
            must_var("BAZAAR_OWNER_USER")?,
            must_var("BAZAAR_OWNER_PASSWORD")?,
        )),
    }
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    env::var(name).map_err(|_| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}
