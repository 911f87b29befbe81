//! Role management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::error::AppError;
use gatehouse_core::types::{ButtonId, MenuId};
use gatehouse_entity::role::{NewRole, Role};
use gatehouse_service::ServiceRegistry;

use super::menu::MenuRow;
use crate::output::{self, OutputFormat};

/// Arguments for role commands
#[derive(Debug, Args)]
pub struct RoleArgs {
    /// Role subcommand
    #[command(subcommand)]
    pub command: RoleCommand,
}

/// Role subcommands
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// Create a role
    Create {
        /// Role name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List all roles
    List,
    /// Delete a role, its grants, and its assignments
    Delete {
        /// Role name
        name: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Replace the menus and buttons a role grants
    Grant {
        /// Role name
        name: String,
        /// Menu IDs, comma separated
        #[arg(long, value_delimiter = ',')]
        menus: Vec<MenuId>,
        /// Button IDs, comma separated
        #[arg(long, value_delimiter = ',')]
        buttons: Vec<ButtonId>,
    },
    /// Show the menus a role grants
    Menus {
        /// Role name
        name: String,
    },
}

/// Role display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role ID
    id: i64,
    /// Name
    name: String,
    /// Description
    description: String,
}

impl From<&Role> for RoleRow {
    fn from(r: &Role) -> Self {
        Self {
            id: r.id.get(),
            name: r.name.clone(),
            description: output::or_dash(r.description.as_deref()),
        }
    }
}

/// Execute role commands
pub async fn execute(
    args: &RoleArgs,
    registry: &ServiceRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    let roles = &registry.roles;

    match &args.command {
        RoleCommand::Create { name, description } => {
            let role = roles
                .create_role(NewRole {
                    name: name.clone(),
                    description: description.clone(),
                })
                .await?;
            output::print_success(&format!("Role '{}' created (id: {})", role.name, role.id));
        }
        RoleCommand::List => {
            let rows: Vec<RoleRow> = roles.list_roles().await?.iter().map(RoleRow::from).collect();
            output::print_list(&rows, format);
        }
        RoleCommand::Delete { name, force } => {
            let role = roles.get_role_by_name(name).await?;
            if !super::confirm(
                &format!("Delete role '{}' and all its assignments?", role.name),
                *force,
            )? {
                println!("Cancelled.");
                return Ok(());
            }
            roles.delete_role(role.id).await?;
            output::print_success(&format!("Role '{}' deleted", role.name));
        }
        RoleCommand::Grant {
            name,
            menus,
            buttons,
        } => {
            let role = roles.get_role_by_name(name).await?;
            roles.set_role_permissions(role.id, menus, buttons).await?;
            if menus.is_empty() && buttons.is_empty() {
                output::print_warning(&format!("Role '{}' now grants nothing", role.name));
            } else {
                output::print_success(&format!("Grants of role '{}' replaced", role.name));
            }
        }
        RoleCommand::Menus { name } => {
            let role = roles.get_role_by_name(name).await?;
            let rows: Vec<MenuRow> = roles
                .get_menus_for_role(role.id)
                .await?
                .iter()
                .map(MenuRow::from)
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
