//! User directory: account CRUD and identity-bound password changes.

use std::sync::Arc;

use tracing::info;

use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_auth::session::SessionManager;
use gatehouse_core::error::AppError;
use gatehouse_core::events::AccessEvent;
use gatehouse_core::traits::PermissionInvalidator;
use gatehouse_core::types::UserId;
use gatehouse_database::repositories::UserRepository;
use gatehouse_entity::session::TerminationReason;
use gatehouse_entity::user::{NewUser, PasswordChange, ProfileUpdate, UpdateUser, User, UserStatus};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 64;

/// Owns user records and routes every password operation through the
/// credential store.
#[derive(Clone)]
pub struct UserDirectory {
    /// User repository.
    users: Arc<dyn UserRepository>,
    /// Session manager, for ending sessions of deleted or deactivated users.
    sessions: Arc<SessionManager>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password policy.
    validator: Arc<PasswordValidator>,
    /// Permission cache invalidation.
    invalidator: Arc<dyn PermissionInvalidator>,
}

impl std::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDirectory")
            .field("users", &self.users)
            .field("invalidator", &self.invalidator)
            .finish_non_exhaustive()
    }
}

impl UserDirectory {
    /// Creates a new user directory.
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<SessionManager>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        invalidator: Arc<dyn PermissionInvalidator>,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            validator,
            invalidator,
        }
    }

    /// Create a user, hashing the initial password.
    ///
    /// `InvalidInput` for a missing or malformed username, a missing
    /// password, or a password that fails the policy. `Conflict` when the
    /// username is taken.
    pub async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let username = new.username.trim().to_string();
        validate_username(&username)?;
        if new.password.is_empty() {
            return Err(AppError::invalid_input("Password is required"));
        }
        let email = normalize_email(new.email.as_deref())?;

        let mut inputs = vec![username.as_str()];
        if let Some(email) = email.as_deref() {
            inputs.push(email);
        }
        self.validator.validate(&new.password, &inputs)?;

        let password_hash = self.hasher.hash_password(&new.password)?;
        let user = self
            .users
            .create(
                &NewUser {
                    username,
                    email,
                    description: new
                        .description
                        .map(|d| d.trim().to_string())
                        .filter(|d| !d.is_empty()),
                    ..new
                },
                &password_hash,
            )
            .await?;

        info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Update profile fields. Username and credential are never written.
    ///
    /// A payload carrying a different username or any password is rejected
    /// with `InvalidInput` before anything is stored.
    pub async fn update(&self, update: UpdateUser) -> Result<User, AppError> {
        let existing = self.get(update.id).await?;

        if let Some(username) = &update.username {
            if username.trim() != existing.username {
                return Err(AppError::invalid_input("Username cannot be changed"));
            }
        }
        if update.password.as_deref().is_some_and(|p| !p.is_empty()) {
            return Err(AppError::invalid_input(
                "Password cannot be changed through a profile update",
            ));
        }
        normalize_email(update.email.as_deref())?;

        let profile = ProfileUpdate::from(&update);
        let user = self.users.update_profile(update.id, &profile).await?;

        if existing.status.can_login() && user.status == UserStatus::Inactive {
            self.sessions
                .revoke_all_for_user(user.id, TerminationReason::Revoked)
                .await?;
        }

        info!(user_id = %user.id, "User profile updated");
        Ok(user)
    }

    /// Delete a user, its role assignments, and its sessions.
    pub async fn delete(&self, id: UserId) -> Result<(), AppError> {
        let active = self.sessions.active_sessions(id).await?;

        if !self.users.delete(id).await? {
            return Err(AppError::not_found(format!("User {id} not found")));
        }

        self.sessions.blocklist(&active).await?;
        self.invalidator
            .invalidate(&AccessEvent::UserDeleted { user_id: id })
            .await?;

        info!(user_id = %id, sessions = active.len(), "User deleted");
        Ok(())
    }

    /// Get a user by ID.
    pub async fn get(&self, id: UserId) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<User, AppError> {
        self.users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{}' not found", username.trim())))
    }

    /// List all users ordered by ID.
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }

    /// Change a password on behalf of `requester`.
    ///
    /// Checks run in a fixed order: the requester must be the target
    /// (`Forbidden`), the target must exist (`NotFound`), the current
    /// password must verify (`InvalidCredential`), then the new password
    /// must match its confirmation, satisfy the policy, and differ from the
    /// current one (`InvalidInput`).
    pub async fn change_password(
        &self,
        requester: UserId,
        change: &PasswordChange,
    ) -> Result<(), AppError> {
        if requester != change.user_id {
            return Err(AppError::forbidden(
                "Cannot change another user's password",
            ));
        }

        let user = self.get(change.user_id).await?;
        let credential = self
            .users
            .find_credential(user.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?;

        if !self
            .hasher
            .verify_password(&change.current_password, &credential.password_hash)?
        {
            return Err(AppError::invalid_credential("Current password is incorrect"));
        }

        if change.new_password != change.confirm_password {
            return Err(AppError::invalid_input(
                "New password and confirmation do not match",
            ));
        }
        self.validator
            .validate(&change.new_password, &[user.username.as_str()])?;
        self.validator
            .validate_not_same(&change.current_password, &change.new_password)?;

        let new_hash = self.hasher.hash_password(&change.new_password)?;
        self.users.update_credential(user.id, &new_hash).await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::invalid_input("Username is required"));
    }
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AppError::invalid_input(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AppError::invalid_input(
            "Username may contain only letters, digits, '_', '.', and '-'",
        ));
    }
    Ok(())
}

/// Trim an email; blank means absent. Anything else needs an `@`.
fn normalize_email(email: Option<&str>) -> Result<Option<String>, AppError> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) if !e.contains('@') => Err(AppError::invalid_input(format!(
            "Invalid email address: '{e}'"
        ))),
        other => Ok(other.map(str::to_string)),
    }
}
