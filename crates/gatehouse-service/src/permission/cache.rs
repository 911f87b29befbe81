//! Versioned cache of resolved menu trees and button sets.
//!
//! Every entry is keyed by the global menu epoch and the user's
//! generation counter, read before the grant snapshot is taken. A writer
//! bumps the relevant counter after its commit, so an entry computed from a
//! pre-commit snapshot can only have been stored under a stale key.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use gatehouse_cache::CacheManager;
use gatehouse_cache::keys;
use gatehouse_core::config::CacheConfig;
use gatehouse_core::events::AccessEvent;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::{CacheProvider, PermissionInvalidator};
use gatehouse_core::types::{MenuId, UserId};
use gatehouse_entity::menu::{Button, MenuNode};

/// The counters a cached resolution was computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    /// Global menu epoch.
    pub epoch: i64,
    /// Per-user generation.
    pub generation: i64,
}

/// Resolved-permission cache backed by the configured [`CacheManager`].
#[derive(Debug, Clone)]
pub struct PermissionCache {
    cache: Arc<CacheManager>,
    ttl: Duration,
}

impl PermissionCache {
    /// Creates a permission cache with the configured entry TTL.
    pub fn new(cache: Arc<CacheManager>, config: &CacheConfig) -> Self {
        Self {
            cache,
            ttl: Duration::from_secs(config.permission_ttl_seconds.max(1)),
        }
    }

    /// Read the counters that key the user's entries.
    pub async fn stamp(&self, user_id: UserId) -> AppResult<Stamp> {
        let epoch = self.cache.counter(&keys::permission_epoch()).await?;
        let generation = self
            .cache
            .counter(&keys::permission_generation(user_id))
            .await?;
        Ok(Stamp { epoch, generation })
    }

    /// Cached menu tree, if present.
    pub async fn menus(&self, user_id: UserId, stamp: Stamp) -> AppResult<Option<Vec<MenuNode>>> {
        let key = keys::user_menus(stamp.epoch, user_id, stamp.generation);
        let hit = self.cache.get_json(&key).await?;
        if hit.is_some() {
            debug!(user_id = %user_id, "Menu tree cache hit");
        }
        Ok(hit)
    }

    /// Store a menu tree.
    pub async fn put_menus(&self, user_id: UserId, stamp: Stamp, tree: &[MenuNode]) -> AppResult<()> {
        let key = keys::user_menus(stamp.epoch, user_id, stamp.generation);
        self.cache.set_json(&key, &tree, self.ttl).await
    }

    /// Cached button set, if present.
    pub async fn buttons(
        &self,
        user_id: UserId,
        menu_id: MenuId,
        stamp: Stamp,
    ) -> AppResult<Option<Vec<Button>>> {
        let key = keys::user_buttons(stamp.epoch, user_id, stamp.generation, menu_id);
        let hit = self.cache.get_json(&key).await?;
        if hit.is_some() {
            debug!(user_id = %user_id, menu_id = %menu_id, "Button set cache hit");
        }
        Ok(hit)
    }

    /// Store a button set.
    pub async fn put_buttons(
        &self,
        user_id: UserId,
        menu_id: MenuId,
        stamp: Stamp,
        buttons: &[Button],
    ) -> AppResult<()> {
        let key = keys::user_buttons(stamp.epoch, user_id, stamp.generation, menu_id);
        self.cache.set_json(&key, &buttons, self.ttl).await
    }
}

#[async_trait]
impl PermissionInvalidator for PermissionCache {
    async fn invalidate(&self, event: &AccessEvent) -> AppResult<()> {
        match event.affected_users() {
            Some(users) => {
                for user_id in users {
                    self.cache
                        .incr(&keys::permission_generation(user_id))
                        .await?;
                }
            }
            None => {
                self.cache.incr(&keys::permission_epoch()).await?;
            }
        }
        debug!(event = ?event, "Permission cache invalidated");
        Ok(())
    }
}
