//! Role assignment CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::error::AppError;
use gatehouse_service::ServiceRegistry;

use crate::output::{self, OutputFormat};

/// Arguments for assignment commands
#[derive(Debug, Args)]
pub struct AssignArgs {
    /// Assignment subcommand
    #[command(subcommand)]
    pub command: AssignCommand,
}

/// Assignment subcommands
#[derive(Debug, Subcommand)]
pub enum AssignCommand {
    /// Replace a user's roles
    Set {
        /// Username
        username: String,
        /// Role names; none clears every role
        roles: Vec<String>,
    },
    /// Show a user's roles
    Show {
        /// Username
        username: String,
    },
}

/// Assigned role row for table output
#[derive(Debug, Serialize, Tabled)]
struct AssignedRoleRow {
    /// Role ID
    id: i64,
    /// Name
    name: String,
}

/// Execute assignment commands
pub async fn execute(
    args: &AssignArgs,
    registry: &ServiceRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        AssignCommand::Set { username, roles } => {
            let user = registry.users.get_by_username(username).await?;
            let mut role_ids = Vec::with_capacity(roles.len());
            for name in roles {
                role_ids.push(registry.roles.get_role_by_name(name).await?.id);
            }
            registry.assignments.set_user_roles(user.id, &role_ids).await?;
            output::print_success(&format!(
                "User '{}' now holds {} role(s)",
                user.username,
                role_ids.len()
            ));
        }
        AssignCommand::Show { username } => {
            let user = registry.users.get_by_username(username).await?;
            let rows: Vec<AssignedRoleRow> = registry
                .assignments
                .get_roles_for_user(user.id)
                .await?
                .into_iter()
                .map(|r| AssignedRoleRow {
                    id: r.id.get(),
                    name: r.name,
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
