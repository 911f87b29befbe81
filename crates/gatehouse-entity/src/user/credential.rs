//! Password credential and password-change request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gatehouse_core::types::UserId;

/// Stored password credential, one per user.
///
/// `password_hash` is an Argon2id PHC string: algorithm, parameters and
/// salt travel with the hash. This type is never serialized out.
#[derive(Clone, FromRow)]
pub struct Credential {
    /// Owning user.
    pub user_id: UserId,
    /// PHC-encoded password hash.
    pub password_hash: String,
    /// When the password was last set.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// The three-part password change payload bound to a target user.
#[derive(Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    /// The user whose password changes.
    pub user_id: UserId,
    /// Current password, verified before anything is written.
    pub current_password: String,
    /// Desired new password.
    pub new_password: String,
    /// Must equal `new_password`.
    pub confirm_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChange")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}
