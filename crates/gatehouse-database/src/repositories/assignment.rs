//! User to role assignment.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::{RoleId, UserId};
use gatehouse_entity::grant::GrantSnapshot;
use gatehouse_entity::role::Role;

/// Storage for the many-to-many user/role relation.
#[async_trait]
pub trait AssignmentRepository: Send + Sync + std::fmt::Debug {
    /// Roles assigned to the user ordered by id, `None` if the user is absent.
    async fn roles_for_user(&self, user_id: UserId) -> AppResult<Option<Vec<Role>>>;

    /// Replace the user's role set with exactly `role_ids`.
    ///
    /// `NotFound` if the user is absent; `InvalidInput` naming the first
    /// unknown role in input order. Repeated ids collapse.
    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()>;

    /// The user's roles and every grant of those roles, read as one
    /// consistent snapshot. `None` if the user is absent.
    async fn grant_snapshot(&self, user_id: UserId) -> AppResult<Option<GrantSnapshot>>;
}
