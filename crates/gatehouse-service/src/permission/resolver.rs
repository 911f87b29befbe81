//! Resolves the menus and buttons a user may use.
//!
//! Permissions are additive across roles. A user sees the union of the
//! menus granted by each of its roles, and on one menu the union of the
//! buttons granted by those of its roles that also grant the menu.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use gatehouse_core::error::AppError;
use gatehouse_core::types::{ButtonId, MenuId, UserId};
use gatehouse_database::repositories::AssignmentRepository;
use gatehouse_entity::grant::GrantSnapshot;
use gatehouse_entity::menu::{Button, MenuNode};

use super::cache::{PermissionCache, Stamp};
use super::tree::build_menu_tree;

/// Computes visible menu trees and enabled buttons per user.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    /// Source of consistent role/grant snapshots.
    assignments: Arc<dyn AssignmentRepository>,
    /// Optional resolved-permission cache.
    cache: Option<Arc<PermissionCache>>,
}

impl PermissionResolver {
    /// Creates a resolver. Pass `None` to always read through to the store.
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        cache: Option<Arc<PermissionCache>>,
    ) -> Self {
        Self { assignments, cache }
    }

    /// The menu tree visible to a user.
    ///
    /// `NotFound` for an unknown user; an empty forest for a user without
    /// roles.
    pub async fn get_left_menus_for_user(&self, user_id: UserId) -> Result<Vec<MenuNode>, AppError> {
        let stamp = self.stamp(user_id).await;
        if let (Some(cache), Some(stamp)) = (&self.cache, stamp) {
            match cache.menus(user_id, stamp).await {
                Ok(Some(tree)) => return Ok(tree),
                Ok(None) => {}
                Err(e) => warn!(user_id = %user_id, error = %e, "Menu cache read failed"),
            }
        }

        let snapshot = self.snapshot(user_id).await?;
        let tree = build_menu_tree(
            snapshot
                .roles
                .into_iter()
                .flat_map(|grant| grant.menus.into_iter()),
        );

        if let (Some(cache), Some(stamp)) = (&self.cache, stamp) {
            if let Err(e) = cache.put_menus(user_id, stamp, &tree).await {
                warn!(user_id = %user_id, error = %e, "Menu cache write failed");
            }
        }
        Ok(tree)
    }

    /// Buttons enabled for a user on one menu, ordered by ID.
    ///
    /// Empty when no role of the user grants the menu. `NotFound` for an
    /// unknown user.
    pub async fn get_buttons_for_user(
        &self,
        user_id: UserId,
        menu_id: MenuId,
    ) -> Result<Vec<Button>, AppError> {
        let stamp = self.stamp(user_id).await;
        if let (Some(cache), Some(stamp)) = (&self.cache, stamp) {
            match cache.buttons(user_id, menu_id, stamp).await {
                Ok(Some(buttons)) => return Ok(buttons),
                Ok(None) => {}
                Err(e) => {
                    warn!(user_id = %user_id, menu_id = %menu_id, error = %e, "Button cache read failed")
                }
            }
        }

        let snapshot = self.snapshot(user_id).await?;
        let buttons = union_buttons(snapshot, menu_id);

        if let (Some(cache), Some(stamp)) = (&self.cache, stamp) {
            if let Err(e) = cache.put_buttons(user_id, menu_id, stamp, &buttons).await {
                warn!(user_id = %user_id, menu_id = %menu_id, error = %e, "Button cache write failed");
            }
        }
        Ok(buttons)
    }

    /// Whether the user may use the button with `code` on `menu_id`.
    pub async fn is_button_permitted(
        &self,
        user_id: UserId,
        menu_id: MenuId,
        code: &str,
    ) -> Result<bool, AppError> {
        let buttons = self.get_buttons_for_user(user_id, menu_id).await?;
        Ok(buttons.iter().any(|b| b.code == code))
    }

    async fn snapshot(&self, user_id: UserId) -> Result<GrantSnapshot, AppError> {
        self.assignments
            .grant_snapshot(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Counters must be read before the snapshot; `None` disables the cache
    /// for this call.
    async fn stamp(&self, user_id: UserId) -> Option<Stamp> {
        let cache = self.cache.as_ref()?;
        match cache.stamp(user_id).await {
            Ok(stamp) => Some(stamp),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Permission cache unavailable");
                None
            }
        }
    }
}

fn union_buttons(snapshot: GrantSnapshot, menu_id: MenuId) -> Vec<Button> {
    let mut buttons: BTreeMap<ButtonId, Button> = BTreeMap::new();
    for grant in snapshot.roles {
        if !grant.grants_menu(menu_id) {
            continue;
        }
        for button in grant.buttons {
            if button.menu_id == menu_id {
                buttons.entry(button.id).or_insert(button);
            }
        }
    }
    buttons.into_values().collect()
}
