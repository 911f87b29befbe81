//! Database migration commands.

use clap::{Args, Subcommand};

use gatehouse_core::config::{AppConfig, StorageBackend};
use gatehouse_core::error::AppError;
use gatehouse_database::DatabasePool;
use gatehouse_database::connection::mask_password;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply the baseline schema and any pending migrations
    Run,
    /// Check database connectivity
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    if config.database.backend != StorageBackend::Postgres {
        return Err(AppError::configuration(
            "Migrations apply only to the postgres backend",
        ));
    }

    let pool = DatabasePool::connect(&config.database).await?;
    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            gatehouse_database::migration::run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            let healthy = pool.health_check().await?;
            output::print_kv("Database", &mask_password(&config.database.url));
            output::print_kv("Reachable", if healthy { "yes" } else { "no" });
        }
    }
    pool.close().await;

    Ok(())
}
