//! Menu entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gatehouse_core::types::MenuId;

/// A navigable, permission-gated section of the administrative UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Menu {
    /// Unique menu identifier.
    pub id: MenuId,
    /// Parent menu, `None` for top-level entries.
    pub parent_id: Option<MenuId>,
    /// Display name.
    pub name: String,
    /// Route path the menu navigates to.
    pub path: String,
    /// Icon identifier.
    pub icon: Option<String>,
    /// Display order among siblings (ascending).
    pub sort_order: i32,
    /// When the menu was created.
    pub created_at: DateTime<Utc>,
    /// When the menu was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMenu {
    /// Parent menu (must exist).
    #[serde(default)]
    pub parent_id: Option<MenuId>,
    /// Display name.
    pub name: String,
    /// Route path.
    pub path: String,
    /// Icon identifier.
    #[serde(default)]
    pub icon: Option<String>,
    /// Display order.
    #[serde(default)]
    pub sort_order: i32,
}

impl NewMenu {
    /// A root menu with no icon and sort order zero.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            parent_id: None,
            name: name.into(),
            path: path.into(),
            icon: None,
            sort_order: 0,
        }
    }

    /// Place the menu under `parent`.
    pub fn with_parent(mut self, parent: MenuId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Set the display order.
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// Replacement values for a menu's mutable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMenu {
    /// The menu to update.
    pub id: MenuId,
    /// New parent; may not be the menu itself or one of its descendants.
    #[serde(default)]
    pub parent_id: Option<MenuId>,
    /// Display name.
    pub name: String,
    /// Route path.
    pub path: String,
    /// Icon identifier.
    #[serde(default)]
    pub icon: Option<String>,
    /// Display order.
    #[serde(default)]
    pub sort_order: i32,
}

impl UpdateMenu {
    /// An update that rewrites `menu` with its current values.
    pub fn from_menu(menu: &Menu) -> Self {
        Self {
            id: menu.id,
            parent_id: menu.parent_id,
            name: menu.name.clone(),
            path: menu.path.clone(),
            icon: menu.icon.clone(),
            sort_order: menu.sort_order,
        }
    }
}
