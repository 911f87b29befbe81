//! Role assignment: which roles each user holds.

use std::sync::Arc;

use tracing::info;

use gatehouse_core::error::AppError;
use gatehouse_core::events::AccessEvent;
use gatehouse_core::traits::PermissionInvalidator;
use gatehouse_core::types::{RoleId, UserId};
use gatehouse_database::repositories::AssignmentRepository;
use gatehouse_entity::role::Role;

/// Reads and replaces user role sets.
#[derive(Debug, Clone)]
pub struct AssignmentService {
    /// Assignment repository.
    assignments: Arc<dyn AssignmentRepository>,
    /// Permission cache invalidation.
    invalidator: Arc<dyn PermissionInvalidator>,
}

impl AssignmentService {
    /// Creates a new assignment service.
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        invalidator: Arc<dyn PermissionInvalidator>,
    ) -> Self {
        Self {
            assignments,
            invalidator,
        }
    }

    /// Roles held by a user, ordered by role ID.
    ///
    /// `NotFound` if the user does not exist; empty if it holds no roles.
    pub async fn get_roles_for_user(&self, user_id: UserId) -> Result<Vec<Role>, AppError> {
        self.assignments
            .roles_for_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Replace the user's role set with exactly `role_ids`.
    ///
    /// Duplicates collapse. `InvalidInput` names the first unknown role in
    /// input order; nothing is written in that case.
    pub async fn set_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> Result<(), AppError> {
        self.assignments.replace_user_roles(user_id, role_ids).await?;

        info!(user_id = %user_id, roles = ?role_ids, "User roles replaced");
        self.invalidator
            .invalidate(&AccessEvent::UserRolesChanged { user_id })
            .await
    }
}
