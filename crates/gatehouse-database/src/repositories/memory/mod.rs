//! In-memory repository implementation.
//!
//! [`MemoryStore`] keeps every table behind a single `tokio::sync::RwLock`.
//! Each repository method takes the lock once, so writes are atomic and a
//! read sees either all or none of a concurrent write. Identifiers come from
//! monotonic per-table sequences and are never reused.

mod assignment;
mod menu;
mod role;
mod session;
mod user;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use gatehouse_core::types::{ButtonId, MenuId, RoleId, UserId};
use gatehouse_entity::menu::{Button, Menu};
use gatehouse_entity::role::Role;
use gatehouse_entity::session::Session;
use gatehouse_entity::user::{Credential, User};

/// Process-local store implementing every repository trait.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    credentials: BTreeMap<UserId, Credential>,
    roles: BTreeMap<RoleId, Role>,
    menus: BTreeMap<MenuId, Menu>,
    buttons: BTreeMap<ButtonId, Button>,
    role_menus: BTreeMap<RoleId, BTreeSet<MenuId>>,
    role_buttons: BTreeMap<RoleId, BTreeSet<ButtonId>>,
    user_roles: BTreeMap<UserId, BTreeSet<RoleId>>,
    sessions: HashMap<Uuid, Session>,
    sequences: Sequences,
}

#[derive(Debug, Default)]
struct Sequences {
    user: i64,
    role: i64,
    menu: i64,
    button: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn holders(&self, role_id: RoleId) -> Vec<UserId> {
        self.user_roles
            .iter()
            .filter(|(_, roles)| roles.contains(&role_id))
            .map(|(user_id, _)| *user_id)
            .collect()
    }

    fn role_menus(&self, role_id: RoleId) -> Vec<Menu> {
        self.role_menus
            .get(&role_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.menus.get(id).cloned())
            .collect()
    }

    fn role_buttons(&self, role_id: RoleId) -> Vec<Button> {
        self.role_buttons
            .get(&role_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.buttons.get(id).cloned())
            .collect()
    }
}
