//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::error::AppError;
use gatehouse_entity::user::{NewUser, PasswordChange, UpdateUser, User, UserStatus};
use gatehouse_service::ServiceRegistry;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        /// Username
        username: String,
        /// Email
        #[arg(long)]
        email: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Initial password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List all users
    List,
    /// Show one user
    Get {
        /// Username
        username: String,
    },
    /// Update profile fields
    Update {
        /// Username
        username: String,
        /// New email; empty clears it
        #[arg(long)]
        email: Option<String>,
        /// New description; empty clears it
        #[arg(long)]
        description: Option<String>,
        /// New status (active, inactive)
        #[arg(long)]
        status: Option<UserStatus>,
    },
    /// Delete a user and end its sessions
    Delete {
        /// Username
        username: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Change a user's own password
    Passwd {
        /// Username
        username: String,
        /// Current password (will prompt if not provided)
        #[arg(long)]
        current: Option<String>,
        /// New password (will prompt if not provided)
        #[arg(long)]
        new: Option<String>,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct UserRow {
    /// User ID
    id: i64,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Status
    status: String,
    /// Created at
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.get(),
            username: u.username.clone(),
            email: output::or_dash(u.email.as_deref()),
            status: u.status.to_string(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    registry: &ServiceRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    let users = &registry.users;

    match &args.command {
        UserCommand::Create {
            username,
            email,
            description,
            password,
        } => {
            let password = super::prompt_password(password, "Password", true)?;
            let user = users
                .create(NewUser {
                    username: username.clone(),
                    password,
                    email: email.clone(),
                    description: description.clone(),
                    status: None,
                })
                .await?;
            output::print_success(&format!("User '{}' created (id: {})", user.username, user.id));
        }
        UserCommand::List => {
            let rows: Vec<UserRow> = users.list().await?.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Get { username } => {
            let user = users.get_by_username(username).await?;
            match format {
                OutputFormat::Json => output::print_json(&user),
                OutputFormat::Table => {
                    output::print_item(&UserRow::from(&user), format);
                    output::print_kv(
                        "Description",
                        &output::or_dash(user.description.as_deref()),
                    );
                }
            }
        }
        UserCommand::Update {
            username,
            email,
            description,
            status,
        } => {
            let user = users.get_by_username(username).await?;
            let mut update = UpdateUser::new(user.id);
            update.email = email.clone();
            update.description = description.clone();
            update.status = *status;
            let user = users.update(update).await?;
            output::print_success(&format!("User '{}' updated", user.username));
        }
        UserCommand::Delete { username, force } => {
            let user = users.get_by_username(username).await?;
            if !super::confirm(&format!("Delete user '{}'?", user.username), *force)? {
                println!("Cancelled.");
                return Ok(());
            }
            users.delete(user.id).await?;
            output::print_success(&format!("User '{}' deleted", user.username));
        }
        UserCommand::Passwd {
            username,
            current,
            new,
        } => {
            let user = users.get_by_username(username).await?;
            let current_password = super::prompt_password(current, "Current password", false)?;
            let new_password = super::prompt_password(new, "New password", false)?;
            let confirm_password = match new {
                Some(p) => p.clone(),
                None => super::prompt_password(&None, "Confirm new password", false)?,
            };

            // The CLI acts as the account owner.
            users
                .change_password(
                    user.id,
                    &PasswordChange {
                        user_id: user.id,
                        current_password,
                        new_password,
                        confirm_password,
                    },
                )
                .await?;
            output::print_success(&format!("Password changed for '{}'", user.username));
        }
    }

    Ok(())
}
