//! [`MenuRepository`] over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{ButtonId, MenuId};
use gatehouse_entity::menu::{Button, Menu, NewButton, NewMenu, UpdateMenu};

use super::{db_error, map_db_error};
use crate::repositories::MenuRepository;

/// Menu repository backed by `menus` and `buttons`.
#[derive(Debug, Clone)]
pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    /// Create a new menu repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn create_menu(&self, new: &NewMenu) -> AppResult<Menu> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        if let Some(parent) = new.parent_id {
            let found = sqlx::query_scalar::<_, MenuId>(
                "SELECT id FROM menus WHERE id = $1 FOR SHARE",
            )
            .bind(parent)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to check parent menu"))?;
            if found.is_none() {
                return Err(AppError::invalid_input(format!(
                    "Parent menu {parent} does not exist"
                )));
            }
        }

        let menu = sqlx::query_as::<_, Menu>(
            "INSERT INTO menus (parent_id, name, path, icon, sort_order) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(new.parent_id)
        .bind(&new.name)
        .bind(&new.path)
        .bind(&new.icon)
        .bind(new.sort_order)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create menu"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit menu"))?;
        Ok(menu)
    }

    async fn find_menu(&self, id: MenuId) -> AppResult<Option<Menu>> {
        sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find menu"))
    }

    async fn list_menus(&self) -> AppResult<Vec<Menu>> {
        sqlx::query_as::<_, Menu>("SELECT * FROM menus ORDER BY sort_order, id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list menus"))
    }

    async fn update_menu(&self, update: &UpdateMenu) -> AppResult<Menu> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Menu rows are locked in id order to keep concurrent re-parenting
        // from racing past the ancestry check.
        sqlx::query("SELECT id FROM menus ORDER BY id FOR UPDATE")
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock menus"))?;

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM menus WHERE id = $1)")
            .bind(update.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to check menu"))?;
        if !exists {
            return Err(AppError::not_found(format!("Menu {} not found", update.id)));
        }

        if let Some(parent) = update.parent_id {
            let ancestors = sqlx::query_scalar::<_, MenuId>(
                "WITH RECURSIVE chain(id, parent_id) AS ( \
                     SELECT id, parent_id FROM menus WHERE id = $1 \
                     UNION \
                     SELECT m.id, m.parent_id FROM menus m JOIN chain c ON m.id = c.parent_id \
                 ) SELECT id FROM chain",
            )
            .bind(parent)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("Failed to walk menu ancestry"))?;
            if ancestors.is_empty() {
                return Err(AppError::invalid_input(format!(
                    "Parent menu {parent} does not exist"
                )));
            }
            if ancestors.contains(&update.id) {
                return Err(AppError::invalid_input(format!(
                    "Menu {} cannot be its own ancestor",
                    update.id
                )));
            }
        }

        let menu = sqlx::query_as::<_, Menu>(
            "UPDATE menus SET parent_id = $2, name = $3, path = $4, icon = $5, \
             sort_order = $6, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(update.id)
        .bind(update.parent_id)
        .bind(&update.name)
        .bind(&update.path)
        .bind(&update.icon)
        .bind(update.sort_order)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update menu"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit menu update"))?;
        Ok(menu)
    }

    async fn delete_menu(&self, id: MenuId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let children: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menus WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count child menus"))?;
        if children > 0 {
            return Err(AppError::conflict(format!("Menu {id} still has child menus")));
        }

        // buttons, role_menus and role_buttons cascade
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                let restricted = e
                    .as_database_error()
                    .is_some_and(|d| d.is_foreign_key_violation());
                if restricted {
                    AppError::conflict(format!("Menu {id} still has child menus"))
                } else {
                    db_error("Failed to delete menu")(e)
                }
            })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit menu delete"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_button(&self, new: &NewButton) -> AppResult<Button> {
        sqlx::query_as::<_, Button>(
            "INSERT INTO buttons (menu_id, code, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.menu_id)
        .bind(&new.code)
        .bind(&new.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let missing_menu = e
                .as_database_error()
                .is_some_and(|d| d.is_foreign_key_violation());
            if missing_menu {
                AppError::not_found(format!("Menu {} not found", new.menu_id))
            } else {
                map_db_error("Button code already exists in this menu")(e)
            }
        })
    }

    async fn find_button(&self, id: ButtonId) -> AppResult<Option<Button>> {
        sqlx::query_as::<_, Button>("SELECT * FROM buttons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find button"))
    }

    async fn list_buttons(&self, menu_id: MenuId) -> AppResult<Option<Vec<Button>>> {
        if self.find_menu(menu_id).await?.is_none() {
            return Ok(None);
        }
        sqlx::query_as::<_, Button>("SELECT * FROM buttons WHERE menu_id = $1 ORDER BY id")
            .bind(menu_id)
            .fetch_all(&self.pool)
            .await
            .map(Some)
            .map_err(db_error("Failed to list buttons"))
    }

    async fn delete_button(&self, id: ButtonId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM buttons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete button"))?;
        Ok(result.rows_affected() > 0)
    }
}
