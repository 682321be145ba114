use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::DbInfraError;

/// Stable advisory-lock id for a textual key.
pub fn pg_lock_id(key: &str) -> i64 {
    xxh3_64(key.as_bytes()) as i64
}

/// A held migration lock. Must be released explicitly with [`Guard::release`].
pub enum Guard {
    /// Session-level advisory lock. The admin pool is one connection wide, so
    /// unlock runs on the same session that locked.
    Postgres {
        admin_pool: DatabaseConnection,
        lock_id: i64,
    },
    SqliteFile { file: File, path: PathBuf },
    Noop,
}

impl Guard {
    pub async fn release(self) -> Result<(), DbInfraError> {
        match self {
            Guard::Noop => Ok(()),
            Guard::SqliteFile { file, path } => {
                use fs4::fs_std::FileExt;

                // Dropping the handle releases the OS lock regardless.
                if let Err(e) = FileExt::unlock(&file) {
                    debug!(error = %e, lock_path = %path.display(), "sqlite lock unlock returned error");
                }
                debug!(lock_path = %path.display(), "sqlite migration lock released");
                Ok(())
            }
            Guard::Postgres {
                admin_pool,
                lock_id,
            } => {
                let stmt = Statement::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    "SELECT pg_advisory_unlock($1) AS unlocked",
                    vec![lock_id.into()],
                );
                match admin_pool.query_one(stmt).await {
                    Ok(Some(row)) => {
                        let unlocked: bool = row.try_get("", "unlocked").map_err(|e| {
                            DbInfraError::config(format!("failed to read unlock result: {e}"))
                        })?;
                        if !unlocked {
                            warn!(lock_id, "advisory unlock returned false");
                        }
                    }
                    Ok(None) => warn!(lock_id, "advisory unlock returned no row"),
                    Err(e) => warn!(error = %e, lock_id, "advisory unlock failed"),
                }
                Ok(())
            }
        }
    }
}

/// Non-blocking mutual exclusion around schema migrations.
#[async_trait]
pub trait BootstrapLock: Send {
    /// `Ok(None)` means another process holds the lock; the caller backs off.
    async fn try_acquire(&mut self) -> Result<Option<Guard>, DbInfraError>;
}

pub struct PgAdvisoryLock {
    admin_pool: DatabaseConnection,
    lock_id: i64,
}

impl PgAdvisoryLock {
    /// `admin_pool` must be configured with min = max = 1.
    pub fn new(admin_pool: DatabaseConnection, key: &str) -> Self {
        Self {
            admin_pool,
            lock_id: pg_lock_id(key),
        }
    }
}

#[async_trait]
impl BootstrapLock for PgAdvisoryLock {
    async fn try_acquire(&mut self) -> Result<Option<Guard>, DbInfraError> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT pg_try_advisory_lock($1) AS locked",
            vec![self.lock_id.into()],
        );

        let row = self
            .admin_pool
            .query_one(stmt)
            .await
            .map_err(|e| DbInfraError::config(format!("failed to acquire advisory lock: {e}")))?
            .ok_or_else(|| DbInfraError::config("pg_try_advisory_lock returned no row"))?;

        let locked: bool = row
            .try_get("", "locked")
            .map_err(|e| DbInfraError::config(format!("failed to read lock result: {e}")))?;

        Ok(locked.then(|| Guard::Postgres {
            admin_pool: self.admin_pool.clone(),
            lock_id: self.lock_id,
        }))
    }
}

/// Exclusive OS file lock on `<db>.migrate.lock`.
pub struct SqliteFileLock {
    lock_path: PathBuf,
}

impl SqliteFileLock {
    pub fn new(lock_path: &Path) -> Self {
        Self {
            lock_path: lock_path.to_path_buf(),
        }
    }
}

#[async_trait]
impl BootstrapLock for SqliteFileLock {
    async fn try_acquire(&mut self) -> Result<Option<Guard>, DbInfraError> {
        use fs4::fs_std::FileExt;

        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbInfraError::config(format!("failed to create lock directory: {e}"))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| DbInfraError::config(format!("failed to open lock file: {e}")))?;

        match file.try_lock_exclusive() {
            Ok(true) => Ok(Some(Guard::SqliteFile {
                file,
                path: self.lock_path.clone(),
            })),
            Ok(false) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(DbInfraError::config(format!(
                "failed to lock {}: {e}",
                self.lock_path.display()
            ))),
        }
    }
}

/// In-memory databases live inside a single process; nothing to exclude.
pub struct NoopLock;

#[async_trait]
impl BootstrapLock for NoopLock {
    async fn try_acquire(&mut self) -> Result<Option<Guard>, DbInfraError> {
        Ok(Some(Guard::Noop))
    }
}
