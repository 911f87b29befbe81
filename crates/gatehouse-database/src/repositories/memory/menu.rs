//! [`MenuRepository`] for [`MemoryStore`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{ButtonId, MenuId};
use gatehouse_entity::menu::{Button, Menu, NewButton, NewMenu, UpdateMenu};

use super::{MemoryStore, next};
use crate::repositories::MenuRepository;

/// Fails when making `parent` the parent of `id` would close a cycle.
fn check_ancestry(menus: &BTreeMap<MenuId, Menu>, id: MenuId, parent: MenuId) -> AppResult<()> {
    let mut current = Some(parent);
    let mut steps = 0;
    while let Some(cursor) = current {
        if cursor == id {
            return Err(AppError::invalid_input(format!(
                "Menu {id} cannot be its own ancestor"
            )));
        }
        steps += 1;
        if steps > menus.len() {
            break;
        }
        current = menus.get(&cursor).and_then(|m| m.parent_id);
    }
    Ok(())
}

#[async_trait]
impl MenuRepository for MemoryStore {
    async fn create_menu(&self, new: &NewMenu) -> AppResult<Menu> {
        let mut tables = self.tables.write().await;
        if let Some(parent) = new.parent_id {
            if !tables.menus.contains_key(&parent) {
                return Err(AppError::invalid_input(format!(
                    "Parent menu {parent} does not exist"
                )));
            }
        }
        let id = MenuId(next(&mut tables.sequences.menu));
        let now = Utc::now();
        let menu = Menu {
            id,
            parent_id: new.parent_id,
            name: new.name.clone(),
            path: new.path.clone(),
            icon: new.icon.clone(),
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        };
        tables.menus.insert(id, menu.clone());
        Ok(menu)
    }

    async fn find_menu(&self, id: MenuId) -> AppResult<Option<Menu>> {
        Ok(self.tables.read().await.menus.get(&id).cloned())
    }

    async fn list_menus(&self) -> AppResult<Vec<Menu>> {
        let mut menus: Vec<Menu> = self.tables.read().await.menus.values().cloned().collect();
        menus.sort_by_key(|m| (m.sort_order, m.id));
        Ok(menus)
    }

    async fn update_menu(&self, update: &UpdateMenu) -> AppResult<Menu> {
        let mut tables = self.tables.write().await;
        if !tables.menus.contains_key(&update.id) {
            return Err(AppError::not_found(format!("Menu {} not found", update.id)));
        }
        if let Some(parent) = update.parent_id {
            if !tables.menus.contains_key(&parent) {
                return Err(AppError::invalid_input(format!(
                    "Parent menu {parent} does not exist"
                )));
            }
            check_ancestry(&tables.menus, update.id, parent)?;
        }
        let menu = tables
            .menus
            .get_mut(&update.id)
            .ok_or_else(|| AppError::not_found(format!("Menu {} not found", update.id)))?;
        menu.parent_id = update.parent_id;
        menu.name = update.name.clone();
        menu.path = update.path.clone();
        menu.icon = update.icon.clone();
        menu.sort_order = update.sort_order;
        menu.updated_at = Utc::now();
        Ok(menu.clone())
    }

    async fn delete_menu(&self, id: MenuId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.menus.contains_key(&id) {
            return Ok(false);
        }
        if tables.menus.values().any(|m| m.parent_id == Some(id)) {
            return Err(AppError::conflict(format!(
                "Menu {id} still has child menus"
            )));
        }
        tables.menus.remove(&id);
        let orphaned: Vec<ButtonId> = tables
            .buttons
            .values()
            .filter(|b| b.menu_id == id)
            .map(|b| b.id)
            .collect();
        for button_id in &orphaned {
            tables.buttons.remove(button_id);
        }
        for menus in tables.role_menus.values_mut() {
            menus.remove(&id);
        }
        for buttons in tables.role_buttons.values_mut() {
            buttons.retain(|b| !orphaned.contains(b));
        }
        Ok(true)
    }

    async fn create_button(&self, new: &NewButton) -> AppResult<Button> {
        let mut tables = self.tables.write().await;
        if !tables.menus.contains_key(&new.menu_id) {
            return Err(AppError::not_found(format!(
                "Menu {} not found",
                new.menu_id
            )));
        }
        if tables
            .buttons
            .values()
            .any(|b| b.menu_id == new.menu_id && b.code == new.code)
        {
            return Err(AppError::conflict(format!(
                "Button '{}' already exists in menu {}",
                new.code, new.menu_id
            )));
        }
        let id = ButtonId(next(&mut tables.sequences.button));
        let button = Button {
            id,
            menu_id: new.menu_id,
            code: new.code.clone(),
            name: new.name.clone(),
            created_at: Utc::now(),
        };
        tables.buttons.insert(id, button.clone());
        Ok(button)
    }

    async fn find_button(&self, id: ButtonId) -> AppResult<Option<Button>> {
        Ok(self.tables.read().await.buttons.get(&id).cloned())
    }

    async fn list_buttons(&self, menu_id: MenuId) -> AppResult<Option<Vec<Button>>> {
        let tables = self.tables.read().await;
        if !tables.menus.contains_key(&menu_id) {
            return Ok(None);
        }
        Ok(Some(
            tables
                .buttons
                .values()
                .filter(|b| b.menu_id == menu_id)
                .cloned()
                .collect(),
        ))
    }

    async fn delete_button(&self, id: ButtonId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.buttons.remove(&id).is_none() {
            return Ok(false);
        }
        for buttons in tables.role_buttons.values_mut() {
            buttons.remove(&id);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::error::ErrorKind;

    use super::*;

    fn new_menu(name: &str, parent_id: Option<MenuId>, sort_order: i32) -> NewMenu {
        NewMenu {
            parent_id,
            name: name.into(),
            path: format!("/{name}"),
            icon: None,
            sort_order,
        }
    }

    fn update_of(menu: &Menu, parent_id: Option<MenuId>) -> UpdateMenu {
        UpdateMenu {
            id: menu.id,
            parent_id,
            name: menu.name.clone(),
            path: menu.path.clone(),
            icon: menu.icon.clone(),
            sort_order: menu.sort_order,
        }
    }

    #[tokio::test]
    async fn test_create_menu_requires_existing_parent() {
        let store = MemoryStore::new();
        let err = store
            .create_menu(&new_menu("orphan", Some(MenuId(5)), 0))
            .await
            .expect_err("missing parent");
        assert!(err.is(ErrorKind::InvalidInput));
    }

    #[tokio::test]
    async fn test_update_menu_rejects_cycles() {
        let store = MemoryStore::new();
        let root = store.create_menu(&new_menu("system", None, 0)).await.expect("root");
        let child = store
            .create_menu(&new_menu("users", Some(root.id), 0))
            .await
            .expect("child");

        let err = store
            .update_menu(&update_of(&root, Some(child.id)))
            .await
            .expect_err("cycle");
        assert!(err.is(ErrorKind::InvalidInput));

        let err = store
            .update_menu(&update_of(&root, Some(root.id)))
            .await
            .expect_err("self parent");
        assert!(err.is(ErrorKind::InvalidInput));
    }

    #[tokio::test]
    async fn test_delete_menu_with_children_conflicts() {
        let store = MemoryStore::new();
        let root = store.create_menu(&new_menu("system", None, 0)).await.expect("root");
        store
            .create_menu(&new_menu("users", Some(root.id), 0))
            .await
            .expect("child");
        let err = store.delete_menu(root.id).await.expect_err("has children");
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_delete_menu_cascades_buttons() {
        let store = MemoryStore::new();
        let menu = store.create_menu(&new_menu("users", None, 0)).await.expect("menu");
        let button = store
            .create_button(&NewButton {
                menu_id: menu.id,
                code: "user:create".into(),
                name: "Create".into(),
            })
            .await
            .expect("button");
        assert!(store.delete_menu(menu.id).await.expect("delete"));
        assert!(store.find_button(button.id).await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn test_button_code_unique_within_menu() {
        let store = MemoryStore::new();
        let users = store.create_menu(&new_menu("users", None, 0)).await.expect("menu");
        let roles = store.create_menu(&new_menu("roles", None, 1)).await.expect("menu");
        let button = |menu_id| NewButton {
            menu_id,
            code: "create".into(),
            name: "Create".into(),
        };
        store.create_button(&button(users.id)).await.expect("first");
        store.create_button(&button(roles.id)).await.expect("other menu");
        let err = store
            .create_button(&button(users.id))
            .await
            .expect_err("duplicate code");
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_list_menus_orders_by_sort_then_id() {
        let store = MemoryStore::new();
        let b = store.create_menu(&new_menu("b", None, 2)).await.expect("menu");
        let a = store.create_menu(&new_menu("a", None, 1)).await.expect("menu");
        let c = store.create_menu(&new_menu("c", None, 2)).await.expect("menu");
        let ids: Vec<MenuId> = store
            .list_menus()
            .await
            .expect("list")
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }
}
