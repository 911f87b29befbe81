//! Session CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::error::AppError;
use gatehouse_service::ServiceRegistry;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Log in and print a bearer token
    Login {
        /// Username
        username: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Show which user a token belongs to
    Resolve {
        /// Bearer token
        token: String,
    },
    /// End the session behind a token
    Logout {
        /// Bearer token
        token: String,
    },
    /// Delete ended sessions older than the retention window
    Purge,
}

/// Issued token row for table output
#[derive(Debug, Serialize, Tabled)]
struct LoginRow {
    /// Session ID
    session: String,
    /// User ID
    user: i64,
    /// Expires at
    expires_at: String,
    /// Token
    token: String,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    registry: &ServiceRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    let sessions = &registry.sessions;

    match &args.command {
        SessionCommand::Login { username, password } => {
            let password = super::prompt_password(password, "Password", false)?;
            let login = sessions.login(username, &password).await?;
            output::print_item(
                &LoginRow {
                    session: login.session.id.to_string(),
                    user: login.user.id.get(),
                    expires_at: login.session.expires_at.to_rfc3339(),
                    token: login.token,
                },
                format,
            );
        }
        SessionCommand::Resolve { token } => {
            let user_id = sessions.resolve(token).await?;
            let user = registry.users.get(user_id).await?;
            output::print_kv("User ID", &user.id.to_string());
            output::print_kv("Username", &user.username);
        }
        SessionCommand::Logout { token } => {
            sessions.logout(token).await?;
            output::print_success("Logged out");
        }
        SessionCommand::Purge => {
            let removed = registry.session_cleanup.purge_expired().await?;
            output::print_success(&format!("Removed {removed} ended session(s)"));
        }
    }

    Ok(())
}
