//! Menu management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::error::AppError;
use gatehouse_core::types::MenuId;
use gatehouse_entity::menu::{Menu, NewMenu};
use gatehouse_service::ServiceRegistry;

use crate::output::{self, OutputFormat};

/// Arguments for menu commands
#[derive(Debug, Args)]
pub struct MenuArgs {
    /// Menu subcommand
    #[command(subcommand)]
    pub command: MenuCommand,
}

/// Menu subcommands
#[derive(Debug, Subcommand)]
pub enum MenuCommand {
    /// Create a menu
    Create {
        /// Display name
        name: String,
        /// Route path
        path: String,
        /// Parent menu ID
        #[arg(long)]
        parent: Option<MenuId>,
        /// Icon identifier
        #[arg(long)]
        icon: Option<String>,
        /// Display order among siblings
        #[arg(long, default_value_t = 0)]
        sort_order: i32,
    },
    /// List all menus
    List,
    /// Delete a childless menu and its buttons
    Delete {
        /// Menu ID
        id: MenuId,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Menu display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct MenuRow {
    /// Menu ID
    id: i64,
    /// Parent ID
    parent: String,
    /// Name
    name: String,
    /// Path
    path: String,
    /// Sort order
    sort_order: i32,
}

impl From<&Menu> for MenuRow {
    fn from(m: &Menu) -> Self {
        Self {
            id: m.id.get(),
            parent: m
                .parent_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            name: m.name.clone(),
            path: m.path.clone(),
            sort_order: m.sort_order,
        }
    }
}

/// Execute menu commands
pub async fn execute(
    args: &MenuArgs,
    registry: &ServiceRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    let menus = &registry.menus;

    match &args.command {
        MenuCommand::Create {
            name,
            path,
            parent,
            icon,
            sort_order,
        } => {
            let menu = menus
                .create_menu(NewMenu {
                    parent_id: *parent,
                    name: name.clone(),
                    path: path.clone(),
                    icon: icon.clone(),
                    sort_order: *sort_order,
                })
                .await?;
            output::print_success(&format!("Menu '{}' created (id: {})", menu.name, menu.id));
        }
        MenuCommand::List => {
            let rows: Vec<MenuRow> = menus.list_menus().await?.iter().map(MenuRow::from).collect();
            output::print_list(&rows, format);
        }
        MenuCommand::Delete { id, force } => {
            let menu = menus.get_menu(*id).await?;
            if !super::confirm(
                &format!("Delete menu '{}' with its buttons and grants?", menu.name),
                *force,
            )? {
                println!("Cancelled.");
                return Ok(());
            }
            menus.delete_menu(menu.id).await?;
            output::print_success(&format!("Menu '{}' deleted", menu.name));
        }
    }

    Ok(())
}
