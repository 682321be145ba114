pub mod core;
pub mod locking;

pub use core::{build_admin_pool, build_pool, orchestrate_migration, orchestrate_migration_internal};
pub use locking::{BootstrapLock, Guard, NoopLock, PgAdvisoryLock, SqliteFileLock};
