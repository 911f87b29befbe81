//! Menu catalogue and button management.

use std::sync::Arc;

use tracing::info;

use gatehouse_core::error::AppError;
use gatehouse_core::events::AccessEvent;
use gatehouse_core::traits::PermissionInvalidator;
use gatehouse_core::types::{ButtonId, MenuId};
use gatehouse_database::repositories::MenuRepository;
use gatehouse_entity::menu::{Button, Menu, NewButton, NewMenu, UpdateMenu};

/// Manages menus and the buttons attached to them.
#[derive(Debug, Clone)]
pub struct MenuService {
    /// Menu repository.
    menus: Arc<dyn MenuRepository>,
    /// Permission cache invalidation.
    invalidator: Arc<dyn PermissionInvalidator>,
}

impl MenuService {
    /// Creates a new menu service.
    pub fn new(menus: Arc<dyn MenuRepository>, invalidator: Arc<dyn PermissionInvalidator>) -> Self {
        Self { menus, invalidator }
    }

    /// Create a menu. The parent, when given, must exist.
    pub async fn create_menu(&self, new: NewMenu) -> Result<Menu, AppError> {
        let (name, path) = validate_display(&new.name, &new.path)?;
        let menu = self
            .menus
            .create_menu(&NewMenu {
                name,
                path,
                icon: trimmed(new.icon),
                ..new
            })
            .await?;

        info!(menu_id = %menu.id, name = %menu.name, "Menu created");
        self.changed(menu.id).await?;
        Ok(menu)
    }

    /// Replace a menu's fields. A menu may not become its own ancestor.
    pub async fn update_menu(&self, update: UpdateMenu) -> Result<Menu, AppError> {
        let (name, path) = validate_display(&update.name, &update.path)?;
        let menu = self
            .menus
            .update_menu(&UpdateMenu {
                name,
                path,
                icon: trimmed(update.icon),
                ..update
            })
            .await?;

        info!(menu_id = %menu.id, "Menu updated");
        self.changed(menu.id).await?;
        Ok(menu)
    }

    /// Delete a menu, its buttons, and every grant naming them.
    ///
    /// `Conflict` while the menu still has children.
    pub async fn delete_menu(&self, id: MenuId) -> Result<(), AppError> {
        if !self.menus.delete_menu(id).await? {
            return Err(AppError::not_found(format!("Menu {id} not found")));
        }
        info!(menu_id = %id, "Menu deleted");
        self.changed(id).await
    }

    /// Get a menu by ID.
    pub async fn get_menu(&self, id: MenuId) -> Result<Menu, AppError> {
        self.menus
            .find_menu(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Menu {id} not found")))
    }

    /// List all menus ordered by `(sort_order, id)`.
    pub async fn list_menus(&self) -> Result<Vec<Menu>, AppError> {
        self.menus.list_menus().await
    }

    /// Create a button on an existing menu.
    ///
    /// `Conflict` when the code is already used on that menu.
    pub async fn create_button(&self, new: NewButton) -> Result<Button, AppError> {
        let code = new.code.trim();
        if code.is_empty() {
            return Err(AppError::invalid_input("Button code is required"));
        }
        let name = new.name.trim();
        let button = self
            .menus
            .create_button(&NewButton {
                menu_id: new.menu_id,
                code: code.to_string(),
                name: if name.is_empty() { code } else { name }.to_string(),
            })
            .await?;

        info!(button_id = %button.id, menu_id = %button.menu_id, code = %button.code, "Button created");
        self.changed(button.menu_id).await?;
        Ok(button)
    }

    /// Delete a button and every grant naming it.
    pub async fn delete_button(&self, id: ButtonId) -> Result<(), AppError> {
        let button = self.get_button(id).await?;
        if !self.menus.delete_button(id).await? {
            return Err(AppError::not_found(format!("Button {id} not found")));
        }
        info!(button_id = %id, menu_id = %button.menu_id, "Button deleted");
        self.changed(button.menu_id).await
    }

    /// Get a button by ID.
    pub async fn get_button(&self, id: ButtonId) -> Result<Button, AppError> {
        self.menus
            .find_button(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Button {id} not found")))
    }

    /// Buttons of a menu ordered by ID.
    pub async fn list_buttons(&self, menu_id: MenuId) -> Result<Vec<Button>, AppError> {
        self.menus
            .list_buttons(menu_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Menu {menu_id} not found")))
    }

    async fn changed(&self, menu_id: MenuId) -> Result<(), AppError> {
        self.invalidator
            .invalidate(&AccessEvent::MenuChanged { menu_id })
            .await
    }
}

fn validate_display(name: &str, path: &str) -> Result<(String, String), AppError> {
    let (name, path) = (name.trim(), path.trim());
    if name.is_empty() {
        return Err(AppError::invalid_input("Menu name is required"));
    }
    if path.is_empty() {
        return Err(AppError::invalid_input("Menu path is required"));
    }
    Ok((name.to_string(), path.to_string()))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use gatehouse_core::error::ErrorKind;

    use super::*;
    use crate::testing::registry;

    #[tokio::test]
    async fn test_menu_requires_existing_parent() {
        let reg = registry();
        let err = reg
            .menus
            .create_menu(NewMenu::new("Orphan", "/orphan").with_parent(MenuId(77)))
            .await
            .expect_err("missing parent");
        assert!(err.is(ErrorKind::InvalidInput));
        let err = reg
            .menus
            .create_menu(NewMenu::new("  ", "/blank"))
            .await
            .expect_err("blank name");
        assert!(err.is(ErrorKind::InvalidInput));
    }

    #[tokio::test]
    async fn test_menu_cannot_become_its_own_ancestor() {
        let reg = registry();
        let root = reg.menus.create_menu(NewMenu::new("Root", "/")).await.expect("root");
        let child = reg
            .menus
            .create_menu(NewMenu::new("Child", "/child").with_parent(root.id))
            .await
            .expect("child");

        let mut update = UpdateMenu::from_menu(&root);
        update.parent_id = Some(child.id);
        let err = reg.menus.update_menu(update).await.expect_err("cycle");
        assert!(err.is(ErrorKind::InvalidInput));

        let mut update = UpdateMenu::from_menu(&root);
        update.parent_id = Some(root.id);
        let err = reg.menus.update_menu(update).await.expect_err("self parent");
        assert!(err.is(ErrorKind::InvalidInput));
    }

    #[tokio::test]
    async fn test_delete_menu_with_children_conflicts() {
        let reg = registry();
        let root = reg.menus.create_menu(NewMenu::new("Root", "/")).await.expect("root");
        let child = reg
            .menus
            .create_menu(NewMenu::new("Child", "/child").with_parent(root.id))
            .await
            .expect("child");

        let err = reg.menus.delete_menu(root.id).await.expect_err("has children");
        assert!(err.is(ErrorKind::Conflict));
        reg.menus.delete_menu(child.id).await.expect("leaf");
        reg.menus.delete_menu(root.id).await.expect("root");
        let err = reg.menus.delete_menu(root.id).await.expect_err("gone");
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_button_codes_unique_per_menu() {
        let reg = registry();
        let a = reg.menus.create_menu(NewMenu::new("A", "/a")).await.expect("menu");
        let b = reg.menus.create_menu(NewMenu::new("B", "/b")).await.expect("menu");

        let add = reg
            .menus
            .create_button(NewButton::new(a.id, "add", ""))
            .await
            .expect("button");
        assert_eq!(add.name, "add");
        let err = reg
            .menus
            .create_button(NewButton::new(a.id, "add", "Add again"))
            .await
            .expect_err("duplicate");
        assert!(err.is(ErrorKind::Conflict));
        reg.menus
            .create_button(NewButton::new(b.id, "add", "Add"))
            .await
            .expect("same code, other menu");

        let err = reg
            .menus
            .create_button(NewButton::new(MenuId(404), "add", "Add"))
            .await
            .expect_err("missing menu");
        assert!(err.is(ErrorKind::NotFound));

        reg.menus.delete_button(add.id).await.expect("delete");
        assert!(reg.menus.list_buttons(a.id).await.expect("list").is_empty());
    }
}
