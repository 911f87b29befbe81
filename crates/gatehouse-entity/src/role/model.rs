//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gatehouse_core::types::RoleId;

/// A named bundle of menu and button grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    /// Role name (unique).
    pub name: String,
    /// Description (optional).
    #[serde(default)]
    pub description: Option<String>,
}

/// Data for updating a role. `None` leaves a field unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRole {
    /// The role to update.
    pub id: RoleId,
    /// New name (must stay unique).
    #[serde(default)]
    pub name: Option<String>,
    /// New description; an empty string clears it.
    #[serde(default)]
    pub description: Option<String>,
}
