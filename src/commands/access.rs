//! Resolved-permission CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::error::AppError;
use gatehouse_core::types::MenuId;
use gatehouse_entity::menu::MenuNode;
use gatehouse_service::ServiceRegistry;

use super::button::ButtonRow;
use crate::output::{self, OutputFormat};

/// Arguments for access commands
#[derive(Debug, Args)]
pub struct AccessArgs {
    /// Access subcommand
    #[command(subcommand)]
    pub command: AccessCommand,
}

/// Access subcommands
#[derive(Debug, Subcommand)]
pub enum AccessCommand {
    /// Menu tree visible to a user
    Menus {
        /// Username
        username: String,
    },
    /// Buttons enabled for a user on one menu
    Buttons {
        /// Username
        username: String,
        /// Menu ID
        menu: MenuId,
    },
}

/// Flattened tree row for table output
#[derive(Debug, Serialize, Tabled)]
struct TreeRow {
    /// Menu ID
    id: i64,
    /// Name, indented by depth
    name: String,
    /// Path
    path: String,
}

fn flatten(nodes: &[MenuNode], depth: usize, rows: &mut Vec<TreeRow>) {
    for node in nodes {
        rows.push(TreeRow {
            id: node.id.get(),
            name: format!("{}{}", "  ".repeat(depth), node.name),
            path: node.path.clone(),
        });
        flatten(&node.children, depth + 1, rows);
    }
}

/// Execute access commands
pub async fn execute(
    args: &AccessArgs,
    registry: &ServiceRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        AccessCommand::Menus { username } => {
            let user = registry.users.get_by_username(username).await?;
            let tree = registry.permissions.get_left_menus_for_user(user.id).await?;
            match format {
                OutputFormat::Json => output::print_json(&tree),
                OutputFormat::Table => {
                    let mut rows = Vec::new();
                    flatten(&tree, 0, &mut rows);
                    output::print_list(&rows, format);
                }
            }
        }
        AccessCommand::Buttons { username, menu } => {
            let user = registry.users.get_by_username(username).await?;
            let rows: Vec<ButtonRow> = registry
                .permissions
                .get_buttons_for_user(user.id, *menu)
                .await?
                .iter()
                .map(ButtonRow::from)
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
