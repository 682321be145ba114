pub use sea_orm_migration::prelude::*;
pub use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection};
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};

mod m20260301_000001_init; // keep filename + module name in sync
mod m20260301_000002_listing_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_init::Migration),
            Box::new(m20260301_000002_listing_indexes::Migration),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl MigrationCommand {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "fresh" => Some(Self::Fresh),
            "reset" => Some(Self::Reset),
            "refresh" => Some(Self::Refresh),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// Run a migration command against an already-open connection.
/// Used by both the CLI and the backend bootstrap.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let before = get_db_diagnostics(db).await?;

    tracing::info!("▶ cmd={command:?}  backend={}", before.backend);
    tracing::info!("▶ connected to DB: {}", before.name);
    tracing::info!(
        "▶ BEFORE: runner has {} migration(s) defined, {} applied",
        before.defined_count,
        before.applied_count
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        MigrationCommand::Down => Migrator::down(db, None).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Refresh => Migrator::refresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    match result {
        Ok(()) => {
            if command != MigrationCommand::Status {
                let after = get_db_diagnostics(db).await?;
                tracing::info!(
                    "▶ AFTER: runner has {} migration(s) defined, {} applied",
                    after.defined_count,
                    after.applied_count
                );
            }
            tracing::info!("✅ {command:?} OK for {}", before.name);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ {command:?} failed for {}: {e}", before.name);
            Err(e)
        }
    }
}

#[derive(Debug)]
struct DbDiagnostics {
    backend: String,
    name: String,
    applied_count: usize,
    defined_count: usize,
}

async fn get_db_diagnostics(db: &DatabaseConnection) -> Result<DbDiagnostics, DbErr> {
    let backend = db.get_database_backend();

    let name = match backend {
        DatabaseBackend::Postgres => {
            let stmt = Statement::from_string(backend, "select current_database() as name".to_string());
            match db.query_one(stmt).await? {
                Some(row) => row.try_get("", "name")?,
                None => "<unknown>".to_string(),
            }
        }
        DatabaseBackend::Sqlite => {
            let stmt = Statement::from_string(
                backend,
                "SELECT file FROM pragma_database_list WHERE name = 'main'".to_string(),
            );
            match db.query_one(stmt).await? {
                Some(row) => match row.try_get::<String>("", "file") {
                    Ok(file) if file.is_empty() => ":memory:".to_string(),
                    Ok(file) => file,
                    Err(_) => "<unknown>".to_string(),
                },
                None => "<unknown>".to_string(),
            }
        }
        _ => "<unsupported>".to_string(),
    };

    Ok(DbDiagnostics {
        backend: format!("{backend:?}"),
        name,
        applied_count: count_applied_migrations(db).await.unwrap_or(0),
        defined_count: Migrator::migrations().len(),
    })
}

/// Number of applied migrations; 0 when the migration table does not exist yet.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Name of the latest applied migration, if any.
pub async fn get_latest_migration_version(
    db: &DatabaseConnection,
) -> Result<Option<String>, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.last().map(|m| m.name().to_string())),
        Err(DbErr::Exec(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
