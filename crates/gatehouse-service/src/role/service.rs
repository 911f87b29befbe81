//! Role CRUD and role grant management.

use std::sync::Arc;

use tracing::info;

use gatehouse_core::error::AppError;
use gatehouse_core::events::AccessEvent;
use gatehouse_core::traits::PermissionInvalidator;
use gatehouse_core::types::{ButtonId, MenuId, RoleId};
use gatehouse_database::repositories::RoleRepository;
use gatehouse_entity::grant::RolePermissions;
use gatehouse_entity::menu::{Button, Menu};
use gatehouse_entity::role::{NewRole, Role, UpdateRole};

const ROLE_NAME_MAX: usize = 64;

/// Manages roles and the menus and buttons each role grants.
#[derive(Debug, Clone)]
pub struct RoleService {
    /// Role repository.
    roles: Arc<dyn RoleRepository>,
    /// Permission cache invalidation.
    invalidator: Arc<dyn PermissionInvalidator>,
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(roles: Arc<dyn RoleRepository>, invalidator: Arc<dyn PermissionInvalidator>) -> Self {
        Self { roles, invalidator }
    }

    /// Create a role. `Conflict` if the name is taken.
    pub async fn create_role(&self, new: NewRole) -> Result<Role, AppError> {
        let name = validate_role_name(&new.name)?;
        let role = self
            .roles
            .create(&NewRole {
                name,
                description: new
                    .description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
            })
            .await?;

        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    /// Rename a role or change its description.
    pub async fn update_role(&self, update: UpdateRole) -> Result<Role, AppError> {
        let name = update.name.as_deref().map(validate_role_name).transpose()?;
        let role = self
            .roles
            .update(&UpdateRole {
                id: update.id,
                name,
                description: update.description.map(|d| d.trim().to_string()),
            })
            .await?;

        info!(role_id = %role.id, "Role updated");
        Ok(role)
    }

    /// Delete a role together with its grants and assignments.
    pub async fn delete_role(&self, id: RoleId) -> Result<(), AppError> {
        let holders = self
            .roles
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;

        info!(role_id = %id, holders = holders.len(), "Role deleted");
        self.invalidator
            .invalidate(&AccessEvent::RoleDeleted {
                role_id: id,
                holders,
            })
            .await
    }

    /// Get a role by ID.
    pub async fn get_role(&self, id: RoleId) -> Result<Role, AppError> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }

    /// Get a role by its exact name.
    pub async fn get_role_by_name(&self, name: &str) -> Result<Role, AppError> {
        self.roles
            .find_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role '{}' not found", name.trim())))
    }

    /// List all roles ordered by ID.
    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.roles.list().await
    }

    /// Menus granted to a role.
    pub async fn get_menus_for_role(&self, id: RoleId) -> Result<Vec<Menu>, AppError> {
        self.roles
            .menus_for_role(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }

    /// Buttons on `menu_id` granted to a role.
    pub async fn get_buttons_for_role_and_menu(
        &self,
        role_id: RoleId,
        menu_id: MenuId,
    ) -> Result<Vec<Button>, AppError> {
        self.roles
            .buttons_for_role_and_menu(role_id, menu_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {role_id} not found")))
    }

    /// Replace a role's grants with exactly the given menus and buttons.
    ///
    /// The replacement commits completely or not at all. Every button must
    /// belong to one of the granted menus.
    pub async fn set_role_permissions(
        &self,
        role_id: RoleId,
        menu_ids: &[MenuId],
        button_ids: &[ButtonId],
    ) -> Result<(), AppError> {
        let permissions =
            RolePermissions::new(menu_ids.iter().copied(), button_ids.iter().copied());
        let holders = self
            .roles
            .replace_permissions(role_id, &permissions)
            .await?;

        info!(
            role_id = %role_id,
            menus = permissions.menu_ids.len(),
            buttons = permissions.button_ids.len(),
            "Role permissions replaced"
        );
        self.invalidator
            .invalidate(&AccessEvent::RolePermissionsChanged { role_id, holders })
            .await
    }
}

fn validate_role_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_input("Role name is required"));
    }
    if name.chars().count() > ROLE_NAME_MAX {
        return Err(AppError::invalid_input(format!(
            "Role name must be at most {ROLE_NAME_MAX} characters"
        )));
    }
    Ok(name.to_string())
}
