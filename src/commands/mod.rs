//! CLI command definitions and dispatch.

pub mod access;
pub mod assign;
pub mod button;
pub mod menu;
pub mod migrate;
pub mod role;
pub mod session;
pub mod user;

use clap::{Parser, Subcommand};

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_service::ServiceRegistry;

use crate::output::OutputFormat;

/// Gatehouse: identity and role-based access control
#[derive(Debug, Parser)]
#[command(name = "gatehouse", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded next to the base file
    #[arg(short, long, env = "GATEHOUSE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database schema management
    Migrate(migrate::MigrateArgs),
    /// User accounts
    User(user::UserArgs),
    /// Roles and their grants
    Role(role::RoleArgs),
    /// Menus
    Menu(menu::MenuArgs),
    /// Buttons within menus
    Button(button::ButtonArgs),
    /// User role assignment
    Assign(assign::AssignArgs),
    /// Resolved menus and buttons of a user
    Access(access::AccessArgs),
    /// Login sessions
    Session(session::SessionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        if let Commands::Migrate(args) = &self.command {
            return migrate::execute(args, &config).await;
        }

        let registry = ServiceRegistry::from_config(&config).await?;
        match &self.command {
            Commands::Migrate(_) => Ok(()),
            Commands::User(args) => user::execute(args, &registry, self.format).await,
            Commands::Role(args) => role::execute(args, &registry, self.format).await,
            Commands::Menu(args) => menu::execute(args, &registry, self.format).await,
            Commands::Button(args) => button::execute(args, &registry, self.format).await,
            Commands::Assign(args) => assign::execute(args, &registry, self.format).await,
            Commands::Access(args) => access::execute(args, &registry, self.format).await,
            Commands::Session(args) => session::execute(args, &registry, self.format).await,
        }
    }
}

/// Read a value from the prompt when it was not given on the command line.
pub fn prompt_password(given: &Option<String>, prompt: &str, confirm: bool) -> Result<String, AppError> {
    if let Some(p) = given {
        return Ok(p.clone());
    }
    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Confirm password", "Passwords do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

/// Ask for confirmation unless `force` is set.
pub fn confirm(prompt: &str, force: bool) -> Result<bool, AppError> {
    if force {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
