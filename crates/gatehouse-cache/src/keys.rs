//! Cache key builders for every Gatehouse cache entry.
//!
//! Resolved-permission keys embed the global menu epoch and the user's
//! generation. Bumping either counter orphans every entry built under the
//! old value; orphans age out through their TTL.

use uuid::Uuid;

use gatehouse_core::types::{MenuId, UserId};

// ── Session keys ───────────────────────────────────────────

/// Marker for a revoked session, set until the session would have expired.
pub fn session_revoked(session_id: Uuid) -> String {
    format!("session:revoked:{session_id}")
}

// ── Permission keys ────────────────────────────────────────

/// Counter bumped whenever the menu catalogue changes.
pub fn permission_epoch() -> String {
    "perm:epoch".to_string()
}

/// Counter bumped whenever a user's effective grants change.
pub fn permission_generation(user_id: UserId) -> String {
    format!("perm:gen:user:{user_id}")
}

/// Resolved menu tree of a user.
pub fn user_menus(epoch: i64, user_id: UserId, generation: i64) -> String {
    format!("perm:e{epoch}:user:{user_id}:g{generation}:menus")
}

/// Resolved button set of a user within one menu.
pub fn user_buttons(epoch: i64, user_id: UserId, generation: i64, menu_id: MenuId) -> String {
    format!("perm:e{epoch}:user:{user_id}:g{generation}:buttons:{menu_id}")
}
