//! Button management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::error::AppError;
use gatehouse_core::types::MenuId;
use gatehouse_entity::menu::{Button, NewButton};
use gatehouse_service::ServiceRegistry;

use crate::output::{self, OutputFormat};

/// Arguments for button commands
#[derive(Debug, Args)]
pub struct ButtonArgs {
    /// Button subcommand
    #[command(subcommand)]
    pub command: ButtonCommand,
}

/// Button subcommands
#[derive(Debug, Subcommand)]
pub enum ButtonCommand {
    /// Create a button on a menu
    Create {
        /// Owning menu ID
        menu: MenuId,
        /// Action code, unique within the menu
        code: String,
        /// Display label (defaults to the code)
        #[arg(long)]
        name: Option<String>,
    },
    /// List the buttons of a menu
    List {
        /// Menu ID
        menu: MenuId,
    },
}

/// Button display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct ButtonRow {
    /// Button ID
    id: i64,
    /// Menu ID
    menu: i64,
    /// Code
    code: String,
    /// Name
    name: String,
}

impl From<&Button> for ButtonRow {
    fn from(b: &Button) -> Self {
        Self {
            id: b.id.get(),
            menu: b.menu_id.get(),
            code: b.code.clone(),
            name: b.name.clone(),
        }
    }
}

/// Execute button commands
pub async fn execute(
    args: &ButtonArgs,
    registry: &ServiceRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ButtonCommand::Create { menu, code, name } => {
            let button = registry
                .menus
                .create_button(NewButton::new(*menu, code.clone(), name.clone().unwrap_or_default()))
                .await?;
            output::print_success(&format!(
                "Button '{}' created on menu {} (id: {})",
                button.code, button.menu_id, button.id
            ));
        }
        ButtonCommand::List { menu } => {
            let rows: Vec<ButtonRow> = registry
                .menus
                .list_buttons(*menu)
                .await?
                .iter()
                .map(ButtonRow::from)
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
