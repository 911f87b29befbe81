//! Role definitions and role grants.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::{MenuId, RoleId, UserId};
use gatehouse_entity::grant::RolePermissions;
use gatehouse_entity::menu::{Button, Menu};
use gatehouse_entity::role::{NewRole, Role, UpdateRole};

/// Storage for roles and the menus and buttons attached to them.
#[async_trait]
pub trait RoleRepository: Send + Sync + std::fmt::Debug {
    /// Insert a role. `Conflict` on a duplicate name.
    async fn create(&self, new: &NewRole) -> AppResult<Role>;

    /// Find a role by primary key.
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>>;

    /// Find a role by its exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// All roles ordered by id.
    async fn list(&self) -> AppResult<Vec<Role>>;

    /// Rename or re-describe a role. `NotFound` if absent, `Conflict` on a
    /// name already used by another role.
    async fn update(&self, update: &UpdateRole) -> AppResult<Role>;

    /// Remove a role with its grants and assignments.
    ///
    /// Returns the users that held the role, or `None` if it did not exist.
    async fn delete(&self, id: RoleId) -> AppResult<Option<Vec<UserId>>>;

    /// Menus granted to the role ordered by id, `None` if the role is absent.
    async fn menus_for_role(&self, id: RoleId) -> AppResult<Option<Vec<Menu>>>;

    /// Buttons on `menu_id` granted to the role ordered by id, `None` if the
    /// role is absent.
    async fn buttons_for_role_and_menu(
        &self,
        id: RoleId,
        menu_id: MenuId,
    ) -> AppResult<Option<Vec<Button>>>;

    /// Replace the role's grants with exactly `permissions`.
    ///
    /// `NotFound` for an unknown role; `InvalidInput` for the first unknown
    /// menu or button, or a button whose menu is not part of the grant.
    /// Returns the users holding the role at commit time.
    async fn replace_permissions(
        &self,
        id: RoleId,
        permissions: &RolePermissions,
    ) -> AppResult<Vec<UserId>>;

    /// Users currently holding the role, ordered by id.
    async fn holders(&self, id: RoleId) -> AppResult<Vec<UserId>>;
}
