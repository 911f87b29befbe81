//! [`RoleRepository`] for [`MemoryStore`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{MenuId, RoleId, UserId};
use gatehouse_entity::grant::RolePermissions;
use gatehouse_entity::menu::{Button, Menu};
use gatehouse_entity::role::{NewRole, Role, UpdateRole};

use super::{MemoryStore, next};
use crate::repositories::RoleRepository;

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn create(&self, new: &NewRole) -> AppResult<Role> {
        let mut tables = self.tables.write().await;
        if tables.roles.values().any(|r| r.name == new.name) {
            return Err(AppError::conflict(format!(
                "Role '{}' already exists",
                new.name
            )));
        }
        let id = RoleId(next(&mut tables.sequences.role));
        let now = Utc::now();
        let role = Role {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.roles.insert(id, role.clone());
        Ok(role)
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.tables.read().await.roles.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .tables
            .read()
            .await
            .roles
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        Ok(self.tables.read().await.roles.values().cloned().collect())
    }

    async fn update(&self, update: &UpdateRole) -> AppResult<Role> {
        let mut tables = self.tables.write().await;
        if let Some(name) = &update.name {
            if tables
                .roles
                .values()
                .any(|r| r.id != update.id && &r.name == name)
            {
                return Err(AppError::conflict(format!("Role '{name}' already exists")));
            }
        }
        let role = tables
            .roles
            .get_mut(&update.id)
            .ok_or_else(|| AppError::not_found(format!("Role {} not found", update.id)))?;
        if let Some(name) = &update.name {
            role.name = name.clone();
        }
        if let Some(description) = &update.description {
            role.description = (!description.is_empty()).then(|| description.clone());
        }
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete(&self, id: RoleId) -> AppResult<Option<Vec<UserId>>> {
        let mut tables = self.tables.write().await;
        if tables.roles.remove(&id).is_none() {
            return Ok(None);
        }
        let holders = tables.holders(id);
        tables.role_menus.remove(&id);
        tables.role_buttons.remove(&id);
        for roles in tables.user_roles.values_mut() {
            roles.remove(&id);
        }
        Ok(Some(holders))
    }

    async fn menus_for_role(&self, id: RoleId) -> AppResult<Option<Vec<Menu>>> {
        let tables = self.tables.read().await;
        if !tables.roles.contains_key(&id) {
            return Ok(None);
        }
        Ok(Some(tables.role_menus(id)))
    }

    async fn buttons_for_role_and_menu(
        &self,
        id: RoleId,
        menu_id: MenuId,
    ) -> AppResult<Option<Vec<Button>>> {
        let tables = self.tables.read().await;
        if !tables.roles.contains_key(&id) {
            return Ok(None);
        }
        let buttons = tables
            .role_buttons(id)
            .into_iter()
            .filter(|b| b.menu_id == menu_id)
            .collect();
        Ok(Some(buttons))
    }

    async fn replace_permissions(
        &self,
        id: RoleId,
        permissions: &RolePermissions,
    ) -> AppResult<Vec<UserId>> {
        let mut tables = self.tables.write().await;
        if !tables.roles.contains_key(&id) {
            return Err(AppError::not_found(format!("Role {id} not found")));
        }

        let menus: BTreeSet<MenuId> = permissions.menu_ids.iter().copied().collect();
        if let Some(missing) = permissions
            .menu_ids
            .iter()
            .find(|m| !tables.menus.contains_key(*m))
        {
            return Err(AppError::invalid_input(format!("Menu {missing} does not exist")));
        }
        for button_id in &permissions.button_ids {
            let button = tables.buttons.get(button_id).ok_or_else(|| {
                AppError::invalid_input(format!("Button {button_id} does not exist"))
            })?;
            if !menus.contains(&button.menu_id) {
                return Err(AppError::invalid_input(format!(
                    "Button {button_id} belongs to menu {} which is not granted",
                    button.menu_id
                )));
            }
        }

        tables.role_menus.insert(id, menus);
        tables
            .role_buttons
            .insert(id, permissions.button_ids.iter().copied().collect());
        Ok(tables.holders(id))
    }

    async fn holders(&self, id: RoleId) -> AppResult<Vec<UserId>> {
        Ok(self.tables.read().await.holders(id))
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::error::ErrorKind;
    use gatehouse_core::types::ButtonId;
    use gatehouse_entity::menu::{NewButton, NewMenu};

    use super::*;
    use crate::repositories::MenuRepository;

    fn new_menu(name: &str) -> NewMenu {
        NewMenu {
            parent_id: None,
            name: name.into(),
            path: format!("/{name}"),
            icon: None,
            sort_order: 0,
        }
    }

    async fn role(store: &MemoryStore, name: &str) -> Role {
        RoleRepository::create(
            store,
            &NewRole {
                name: name.into(),
                description: None,
            },
        )
        .await
        .expect("create role")
    }

    #[tokio::test]
    async fn test_replace_permissions_replaces_previous_grant() {
        let store = MemoryStore::new();
        let admin = role(&store, "admin").await;
        let users = store.create_menu(&new_menu("users")).await.expect("menu");
        let logs = store.create_menu(&new_menu("logs")).await.expect("menu");

        store
            .replace_permissions(admin.id, &RolePermissions::new([users.id], []))
            .await
            .expect("first grant");
        store
            .replace_permissions(admin.id, &RolePermissions::new([logs.id], []))
            .await
            .expect("second grant");

        let menus = store
            .menus_for_role(admin.id)
            .await
            .expect("lookup")
            .expect("role exists");
        assert_eq!(menus.iter().map(|m| m.id).collect::<Vec<_>>(), vec![logs.id]);
    }

    #[tokio::test]
    async fn test_replace_permissions_is_all_or_nothing() {
        let store = MemoryStore::new();
        let admin = role(&store, "admin").await;
        let users = store.create_menu(&new_menu("users")).await.expect("menu");
        store
            .replace_permissions(admin.id, &RolePermissions::new([users.id], []))
            .await
            .expect("grant");

        let err = store
            .replace_permissions(admin.id, &RolePermissions::new([MenuId(404)], []))
            .await
            .expect_err("unknown menu");
        assert!(err.is(ErrorKind::InvalidInput));
        assert!(err.message.contains("404"));

        let menus = store
            .menus_for_role(admin.id)
            .await
            .expect("lookup")
            .expect("role exists");
        assert_eq!(menus.len(), 1);
    }

    #[tokio::test]
    async fn test_button_requires_its_menu_in_grant() {
        let store = MemoryStore::new();
        let admin = role(&store, "admin").await;
        let users = store.create_menu(&new_menu("users")).await.expect("menu");
        let button = store
            .create_button(&NewButton {
                menu_id: users.id,
                code: "user:create".into(),
                name: "Create".into(),
            })
            .await
            .expect("button");

        let err = store
            .replace_permissions(admin.id, &RolePermissions::new([], [button.id]))
            .await
            .expect_err("menu missing from grant");
        assert!(err.is(ErrorKind::InvalidInput));

        let err = store
            .replace_permissions(admin.id, &RolePermissions::new([users.id], [ButtonId(77)]))
            .await
            .expect_err("unknown button");
        assert!(err.is(ErrorKind::InvalidInput));
    }

    #[tokio::test]
    async fn test_unknown_role_reads_as_none() {
        let store = MemoryStore::new();
        assert!(store.menus_for_role(RoleId(9)).await.expect("lookup").is_none());
        assert!(store.delete(RoleId(9)).await.expect("delete").is_none());
    }
}
