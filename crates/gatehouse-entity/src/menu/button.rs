//! Button entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gatehouse_core::types::{ButtonId, MenuId};

/// A fine-grained action inside exactly one menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Button {
    /// Unique button identifier.
    pub id: ButtonId,
    /// The menu this button belongs to.
    pub menu_id: MenuId,
    /// Action identifier, unique within the menu (e.g. `user:create`).
    pub code: String,
    /// Display label.
    pub name: String,
    /// When the button was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewButton {
    /// Owning menu (must exist).
    pub menu_id: MenuId,
    /// Action identifier.
    pub code: String,
    /// Display label.
    pub name: String,
}

impl NewButton {
    /// Creates a button request.
    pub fn new(menu_id: MenuId, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            menu_id,
            code: code.into(),
            name: name.into(),
        }
    }
}
