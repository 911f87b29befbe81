//! User and credential storage.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::user::{Credential, NewUser, ProfileUpdate, User};

/// Storage for user records and their password credentials.
///
/// Read methods returning [`User`] never touch the credential; it is only
/// reachable through [`find_credential`](Self::find_credential).
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug {
    /// Insert a user with an already hashed password.
    ///
    /// Fails with `Conflict` when the username exists, compared
    /// case-insensitively. `new.password` is ignored.
    async fn create(&self, new: &NewUser, password_hash: &str) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// All users ordered by id.
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Apply profile changes and bump `updated_at`. `NotFound` if absent.
    async fn update_profile(&self, id: UserId, profile: &ProfileUpdate) -> AppResult<User>;

    /// Remove the user together with its role assignments and sessions.
    ///
    /// Returns `false` when the user did not exist.
    async fn delete(&self, id: UserId) -> AppResult<bool>;

    /// Load the stored credential.
    async fn find_credential(&self, id: UserId) -> AppResult<Option<Credential>>;

    /// Replace the stored password hash. `NotFound` if the user is absent.
    async fn update_credential(&self, id: UserId, password_hash: &str) -> AppResult<()>;
}
