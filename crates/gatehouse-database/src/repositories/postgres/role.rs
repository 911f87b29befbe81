//! [`RoleRepository`] over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{ButtonId, MenuId, RoleId, UserId};
use gatehouse_entity::grant::RolePermissions;
use gatehouse_entity::menu::{Button, Menu};
use gatehouse_entity::role::{NewRole, Role, UpdateRole};

use super::{db_error, map_db_error};
use crate::repositories::RoleRepository;

/// Role repository backed by `roles`, `role_menus` and `role_buttons`.
#[derive(Debug, Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: RoleId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check role"))
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn create(&self, new: &NewRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Role name already exists"))
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find role"))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find role by name"))
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list roles"))
    }

    async fn update(&self, update: &UpdateRole) -> AppResult<Role> {
        let description = update
            .description
            .as_ref()
            .map(|d| (!d.is_empty()).then(|| d.clone()));
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3 THEN $4 ELSE description END, \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(update.id)
        .bind(&update.name)
        .bind(description.is_some())
        .bind(description.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error("Role name already exists"))?
        .ok_or_else(|| AppError::not_found(format!("Role {} not found", update.id)))
    }

    async fn delete(&self, id: RoleId) -> AppResult<Option<Vec<UserId>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let holders = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user_roles WHERE role_id = $1 ORDER BY user_id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to load role holders"))?;

        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete role"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit role delete"))?;
        Ok((result.rows_affected() > 0).then_some(holders))
    }

    async fn menus_for_role(&self, id: RoleId) -> AppResult<Option<Vec<Menu>>> {
        if !self.exists(id).await? {
            return Ok(None);
        }
        sqlx::query_as::<_, Menu>(
            "SELECT m.* FROM menus m JOIN role_menus rm ON rm.menu_id = m.id \
             WHERE rm.role_id = $1 ORDER BY m.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map(Some)
        .map_err(db_error("Failed to load role menus"))
    }

    async fn buttons_for_role_and_menu(
        &self,
        id: RoleId,
        menu_id: MenuId,
    ) -> AppResult<Option<Vec<Button>>> {
        if !self.exists(id).await? {
            return Ok(None);
        }
        sqlx::query_as::<_, Button>(
            "SELECT b.* FROM buttons b JOIN role_buttons rb ON rb.button_id = b.id \
             WHERE rb.role_id = $1 AND b.menu_id = $2 ORDER BY b.id",
        )
        .bind(id)
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await
        .map(Some)
        .map_err(db_error("Failed to load role buttons"))
    }

    async fn replace_permissions(
        &self,
        id: RoleId,
        permissions: &RolePermissions,
    ) -> AppResult<Vec<UserId>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Row lock serializes concurrent replacements of the same role.
        let locked = sqlx::query_scalar::<_, RoleId>("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock role"))?;
        if locked.is_none() {
            return Err(AppError::not_found(format!("Role {id} not found")));
        }

        let known_menus = sqlx::query_scalar::<_, MenuId>("SELECT id FROM menus WHERE id = ANY($1)")
            .bind(&permissions.menu_ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("Failed to check menus"))?;
        if let Some(missing) = permissions
            .menu_ids
            .iter()
            .find(|m| !known_menus.contains(m))
        {
            return Err(AppError::invalid_input(format!("Menu {missing} does not exist")));
        }

        let known_buttons = sqlx::query_as::<_, (ButtonId, MenuId)>(
            "SELECT id, menu_id FROM buttons WHERE id = ANY($1)",
        )
        .bind(&permissions.button_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to check buttons"))?;
        for button_id in &permissions.button_ids {
            let (_, menu_id) = known_buttons
                .iter()
                .find(|(b, _)| b == button_id)
                .ok_or_else(|| {
                    AppError::invalid_input(format!("Button {button_id} does not exist"))
                })?;
            if !permissions.menu_ids.contains(menu_id) {
                return Err(AppError::invalid_input(format!(
                    "Button {button_id} belongs to menu {menu_id} which is not granted"
                )));
            }
        }

        sqlx::query("DELETE FROM role_menus WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear role menus"))?;
        sqlx::query("DELETE FROM role_buttons WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear role buttons"))?;
        sqlx::query("INSERT INTO role_menus (role_id, menu_id) SELECT $1, UNNEST($2::BIGINT[])")
            .bind(id)
            .bind(&permissions.menu_ids)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to grant menus"))?;
        sqlx::query(
            "INSERT INTO role_buttons (role_id, button_id) SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(id)
        .bind(&permissions.button_ids)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to grant buttons"))?;

        let holders = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user_roles WHERE role_id = $1 ORDER BY user_id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to load role holders"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit role permissions"))?;
        Ok(holders)
    }

    async fn holders(&self, id: RoleId) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user_roles WHERE role_id = $1 ORDER BY user_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load role holders"))
    }
}
