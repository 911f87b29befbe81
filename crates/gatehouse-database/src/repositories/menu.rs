//! Menu and button catalogue.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::{ButtonId, MenuId};
use gatehouse_entity::menu::{Button, Menu, NewButton, NewMenu, UpdateMenu};

/// Storage for the menu tree and the buttons inside each menu.
#[async_trait]
pub trait MenuRepository: Send + Sync + std::fmt::Debug {
    /// Insert a menu. `InvalidInput` if the parent does not exist.
    async fn create_menu(&self, new: &NewMenu) -> AppResult<Menu>;

    /// Find a menu by primary key.
    async fn find_menu(&self, id: MenuId) -> AppResult<Option<Menu>>;

    /// All menus ordered by `(sort_order, id)`.
    async fn list_menus(&self) -> AppResult<Vec<Menu>>;

    /// Replace a menu's fields.
    ///
    /// `NotFound` if absent; `InvalidInput` if the new parent is missing or
    /// would make the menu its own ancestor.
    async fn update_menu(&self, update: &UpdateMenu) -> AppResult<Menu>;

    /// Remove a menu, its buttons, and every grant naming either.
    ///
    /// `Conflict` while child menus exist. Returns `false` if absent.
    async fn delete_menu(&self, id: MenuId) -> AppResult<bool>;

    /// Insert a button. `NotFound` if the menu is absent, `Conflict` if the
    /// code is already used in that menu.
    async fn create_button(&self, new: &NewButton) -> AppResult<Button>;

    /// Find a button by primary key.
    async fn find_button(&self, id: ButtonId) -> AppResult<Option<Button>>;

    /// Buttons of a menu ordered by id, `None` if the menu is absent.
    async fn list_buttons(&self, menu_id: MenuId) -> AppResult<Option<Vec<Button>>>;

    /// Remove a button and its grants. Returns `false` if absent.
    async fn delete_button(&self, id: ButtonId) -> AppResult<bool>;
}
