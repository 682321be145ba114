use std::future::Future;
use std::time::{Duration, Instant};

use migration::{migrate, MigrationCommand, Migrator, MigratorTrait};
use rand::Rng;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use tracing::{error, info, trace, warn};

use crate::config::db::{
    build_connection_settings, build_session_statements, make_conn_spec, sqlite_lock_path,
    validate_db_config, ConnectionSettings, DbKind, DbOwner, DbSettings, PoolPurpose, RuntimeEnv,
};
use crate::error::DbInfraError;
use crate::infra::db::locking::{BootstrapLock, Guard, NoopLock, PgAdvisoryLock, SqliteFileLock};

const MIGRATION_BODY_TIMEOUT: Duration = Duration::from_secs(120);

fn engine_name(db_kind: DbKind) -> &'static str {
    match db_kind {
        DbKind::Postgres => "postgresql",
        DbKind::SqliteFile | DbKind::SqliteMemory => "sqlite",
    }
}

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(_) => {
                warn!(
                    "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                    attempt, max_attempts, interval_ms
                );
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
        }
    }
}

async fn connect_with(
    db_kind: DbKind,
    url: &str,
    settings: &ConnectionSettings,
    label: &'static str,
) -> Result<DatabaseConnection, DbInfraError> {
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .sqlx_logging(false);

    let connect = || {
        let opt = opt.clone();
        async move {
            Database::connect(opt).await.map_err(|e| {
                DbInfraError::config(format!(
                    "failed to connect to {} ({label}): {e}",
                    engine_name(db_kind)
                ))
            })
        }
    };

    let pool = if db_kind == DbKind::Postgres {
        retry_connection(connect, 5, 500).await?
    } else {
        connect().await?
    };

    apply_db_settings(&pool, &settings.db_settings, db_kind).await?;
    Ok(pool)
}

/// Single-connection pool with owner credentials, used for DDL and advisory locks.
pub async fn build_admin_pool(
    env: RuntimeEnv,
    db_kind: DbKind,
) -> Result<DatabaseConnection, DbInfraError> {
    let url = make_conn_spec(env, db_kind, DbOwner::Owner)?;
    let settings = build_connection_settings(env, db_kind, PoolPurpose::Migration)?;
    connect_with(db_kind, &url, &settings, "admin pool").await
}

/// Runtime pool with application credentials. Does not migrate.
pub async fn build_pool(
    env: RuntimeEnv,
    db_kind: DbKind,
) -> Result<DatabaseConnection, DbInfraError> {
    validate_db_config(env, db_kind)?;
    let url = make_conn_spec(env, db_kind, DbOwner::App)?;
    let settings = build_connection_settings(env, db_kind, PoolPurpose::Runtime)?;
    info!(
        "pool=about_to_build env={:?} db_kind={:?} max={} owner=App",
        env, db_kind, settings.max_connections
    );
    connect_with(db_kind, &url, &settings, "runtime pool").await
}

/// Mask the password in a connection URL.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((auth, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match auth.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}

/// `true` when every known migration is already applied, in order.
async fn fast_path_schema_check(conn: &DatabaseConnection) -> Result<bool, DbInfraError> {
    let expected_count = Migrator::migrations().len();
    let expected_last = Migrator::migrations()
        .last()
        .map(|m| m.name().to_string())
        .unwrap_or_default();

    let applied = match Migrator::get_applied_migrations(conn).await {
        Ok(applied) => applied,
        Err(DbErr::Exec(_)) => {
            trace!(fastpath = "miss", reason = "migration_table_missing");
            return Ok(false);
        }
        Err(e) => {
            return Err(DbInfraError::migration(format!(
                "failed to get applied migrations: {e}"
            )))
        }
    };

    let current_last = applied.last().map(|m| m.name().to_string());
    let up_to_date = applied.len() == expected_count
        && !expected_last.is_empty()
        && current_last.as_deref() == Some(expected_last.as_str());

    trace!(
        fastpath = if up_to_date { "hit" } else { "miss" },
        current_count = applied.len(),
        expected_count,
        current_last = %current_last.as_deref().unwrap_or(""),
        expected_last = %expected_last
    );
    Ok(up_to_date)
}

/// Connect with owner credentials and run `command` under the engine's lock.
pub async fn orchestrate_migration(
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    validate_db_config(env, db_kind)?;
    let admin_pool = build_admin_pool(env, db_kind).await?;
    orchestrate_migration_internal(&admin_pool, env, db_kind, command).await
}

/// Run `command` on an existing pool. In-memory SQLite must go through here
/// with the runtime pool, since a second pool would see a different database.
pub async fn orchestrate_migration_internal(
    pool: &DatabaseConnection,
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    info!(
        "migrate=start env={:?} db_kind={:?} engine={} command={:?}",
        env,
        db_kind,
        engine_name(db_kind),
        command
    );

    if command == MigrationCommand::Status {
        migrate(pool, command)
            .await
            .map_err(|e| DbInfraError::migration(format!("migration execution failed: {e}")))?;
        info!("migrate=done");
        return Ok(());
    }

    let result = match db_kind {
        DbKind::Postgres => {
            let url = make_conn_spec(env, db_kind, DbOwner::Owner)?;
            let key = format!("bazaar:migrate:{:?}:{}", db_kind, sanitize_db_url(&url));
            let lock = PgAdvisoryLock::new(pool.clone(), &key);
            migrate_with_lock(pool, lock, env, db_kind, command).await
        }
        DbKind::SqliteFile => {
            let lock = SqliteFileLock::new(&sqlite_lock_path(db_kind, env)?);
            migrate_with_lock(pool, lock, env, db_kind, command).await
        }
        DbKind::SqliteMemory => migrate_with_lock(pool, NoopLock, env, db_kind, command).await,
    };

    if let Err(ref e) = result {
        let msg = e.message();
        if msg.contains("database is locked") || msg.contains("SQLITE_BUSY") {
            error!("sqlite_busy op=migrate err={:?}", e);
        }
    }

    info!("migrate=done ok={}", result.is_ok());
    result
}

fn lock_acquire_budget(env: RuntimeEnv) -> Duration {
    let ms = std::env::var("BAZAAR_MIGRATE_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(match env {
            RuntimeEnv::Test => 3000,
            RuntimeEnv::Prod => 900,
        });
    Duration::from_millis(ms)
}

async fn migrate_with_lock<L>(
    pool: &DatabaseConnection,
    mut lock: L,
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError>
where
    L: BootstrapLock,
{
    let budget = lock_acquire_budget(env);
    let start = Instant::now();
    let mut attempts: u32 = 0;

    let guard = loop {
        attempts += 1;

        // Another process may have finished the job while we waited.
        if command == MigrationCommand::Up && fast_path_schema_check(pool).await? {
            info!("migrate=skipped up_to_date=true");
            return Ok(());
        }

        if let Some(guard) = lock.try_acquire().await? {
            trace!(
                lock = "won",
                attempts,
                elapsed_ms = start.elapsed().as_millis()
            );
            break guard;
        }

        let base_delay_ms = (5u64 << attempts.saturating_sub(1).min(4)).min(80);
        let delay_ms = base_delay_ms + rand::rng().random_range(0..4);
        trace!(lock = "backoff", attempts, delay_ms);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        if start.elapsed() >= budget {
            return Err(DbInfraError::migration(format!(
                "migration lock acquisition timeout after {:?} ({} attempts)",
                start.elapsed(),
                attempts
            )));
        }
    };

    let result = run_guarded(pool, &guard, env, db_kind, command).await;
    if let Err(release_err) = guard.release().await {
        warn!(error = %release_err, "failed to release migration guard");
    }
    result
}

async fn run_guarded(
    pool: &DatabaseConnection,
    _guard: &Guard,
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    let start = Instant::now();

    if db_kind == DbKind::SqliteFile {
        for pragma in ["PRAGMA journal_mode = WAL", "PRAGMA synchronous = NORMAL"] {
            pool.execute(Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                pragma.to_string(),
            ))
            .await
            .map_err(|e| DbInfraError::config(format!("failed to apply '{pragma}': {e}")))?;
        }
    }

    match tokio::time::timeout(MIGRATION_BODY_TIMEOUT, migrate(pool, command)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(DbInfraError::migration(format!(
                "migration execution failed: {e}"
            )))
        }
        Err(_) => {
            return Err(DbInfraError::migration(format!(
                "migration body execution timed out after {}ms",
                MIGRATION_BODY_TIMEOUT.as_millis()
            )))
        }
    }

    let expected_count = Migrator::migrations().len();
    let applied_count = Migrator::get_applied_migrations(pool)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    info!(
        migrator = "ran",
        env = ?env,
        db_kind = ?db_kind,
        expected_count,
        applied_count,
        elapsed_ms = start.elapsed().as_millis()
    );

    match command {
        MigrationCommand::Reset if applied_count != 0 => Err(DbInfraError::migration(format!(
            "reset should leave 0 migrations applied, but {applied_count} were found"
        ))),
        MigrationCommand::Up | MigrationCommand::Fresh | MigrationCommand::Refresh
            if applied_count != expected_count =>
        {
            Err(DbInfraError::migration(format!(
                "expected {expected_count} migrations, but {applied_count} were applied"
            )))
        }
        _ => Ok(()),
    }
}

async fn apply_db_settings(
    pool: &DatabaseConnection,
    settings: &DbSettings,
    db_kind: DbKind,
) -> Result<(), DbInfraError> {
    let backend = sea_orm::DatabaseBackend::from(db_kind);
    for stmt in build_session_statements(db_kind, settings) {
        pool.execute(Statement::from_string(backend, stmt))
            .await
            .map_err(|e| DbInfraError::config(format!("failed to apply db settings: {e}")))?;
    }
    Ok(())
}
