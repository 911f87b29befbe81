//! Events that change what a user is allowed to see.

use serde::{Deserialize, Serialize};

use crate::types::{MenuId, RoleId, UserId};

/// A committed change to users, roles, grants, or the menu catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessEvent {
    /// A user's role set was replaced.
    UserRolesChanged {
        /// The user whose roles changed.
        user_id: UserId,
    },
    /// A user was deleted together with its role assignments.
    UserDeleted {
        /// The deleted user.
        user_id: UserId,
    },
    /// A role's menu/button grants were replaced.
    RolePermissionsChanged {
        /// The role whose grants changed.
        role_id: RoleId,
        /// Users holding the role when the change committed.
        holders: Vec<UserId>,
    },
    /// A role was deleted together with its grants and assignments.
    RoleDeleted {
        /// The deleted role.
        role_id: RoleId,
        /// Users that held the role before deletion.
        holders: Vec<UserId>,
    },
    /// A menu or one of its buttons was created, updated, or deleted.
    MenuChanged {
        /// The affected menu.
        menu_id: MenuId,
    },
}

impl AccessEvent {
    /// Users whose cached resolutions become stale, or `None` when every
    /// user may be affected.
    pub fn affected_users(&self) -> Option<Vec<UserId>> {
        match self {
            Self::UserRolesChanged { user_id } | Self::UserDeleted { user_id } => {
                Some(vec![*user_id])
            }
            Self::RolePermissionsChanged { holders, .. } | Self::RoleDeleted { holders, .. } => {
                Some(holders.clone())
            }
            Self::MenuChanged { .. } => None,
        }
    }
}
