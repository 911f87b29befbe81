//! Consistent views of a user's roles and their grants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use gatehouse_core::types::{ButtonId, MenuId, UserId};

use crate::menu::{Button, Menu};
use crate::role::Role;

/// The menus and buttons granted to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// The granting role.
    pub role: Role,
    /// Menus attached to the role.
    pub menus: Vec<Menu>,
    /// Buttons attached to the role.
    pub buttons: Vec<Button>,
}

impl RoleGrant {
    /// Whether this role grants the menu.
    pub fn grants_menu(&self, menu_id: MenuId) -> bool {
        self.menus.iter().any(|m| m.id == menu_id)
    }
}

/// Every role of a user with its grants, read at a single point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSnapshot {
    /// The user the snapshot was taken for.
    pub user_id: UserId,
    /// One entry per assigned role, ordered by role id.
    pub roles: Vec<RoleGrant>,
}

impl GrantSnapshot {
    /// Snapshot for a user with no roles.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            roles: Vec::new(),
        }
    }
}

/// The replacement grant set for a role.
///
/// Construction collapses duplicate ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissions {
    /// Granted menus, in first-seen order.
    pub menu_ids: Vec<MenuId>,
    /// Granted buttons, in first-seen order.
    pub button_ids: Vec<ButtonId>,
}

impl RolePermissions {
    /// Build a grant set, dropping repeated ids while keeping input order.
    pub fn new(
        menu_ids: impl IntoIterator<Item = MenuId>,
        button_ids: impl IntoIterator<Item = ButtonId>,
    ) -> Self {
        Self {
            menu_ids: dedup(menu_ids),
            button_ids: dedup(button_ids),
        }
    }
}

/// Remove duplicates, keeping the first occurrence of each id.
pub fn dedup<T: Ord + Copy>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = BTreeSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
