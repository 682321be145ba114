use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use db_infra::config::db::{DbKind, RuntimeEnv};
use db_infra::infra::db::orchestrate_migration;
use migration::MigrationCommand;
use tracing::error;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Command {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl From<Command> for MigrationCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Up => MigrationCommand::Up,
            Command::Down => MigrationCommand::Down,
            Command::Fresh => MigrationCommand::Fresh,
            Command::Reset => MigrationCommand::Reset,
            Command::Refresh => MigrationCommand::Refresh,
            Command::Status => MigrationCommand::Status,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Env {
    Prod,
    Test,
}

/// In-memory SQLite is deliberately absent: the database would vanish when
/// the command exits.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Db {
    Postgres,
    SqliteFile,
}

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "Bazaar database migration tool")]
struct Args {
    #[arg(value_enum)]
    command: Command,

    #[arg(short, long, value_enum, default_value = "test")]
    env: Env,

    #[arg(short, long, value_enum, default_value = "postgres")]
    db: Db,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_env_filter("migration=info,db_infra=info,sqlx=warn")
        .init();

    let args = Args::parse();

    let env = match args.env {
        Env::Prod => RuntimeEnv::Prod,
        Env::Test => RuntimeEnv::Test,
    };
    let db_kind = match args.db {
        Db::Postgres => DbKind::Postgres,
        Db::SqliteFile => DbKind::SqliteFile,
    };

    match orchestrate_migration(env, db_kind, args.command.into()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, command = ?args.command, "migration failed");
            eprintln!("Migration failed: {e}");
            ExitCode::FAILURE
        }
    }
}
