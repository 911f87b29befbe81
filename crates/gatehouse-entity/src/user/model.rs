//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gatehouse_core::types::UserId;

use super::status::UserStatus;

/// A registered account. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier, never reused.
    pub id: UserId,
    /// Unique login name, immutable after creation.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Account status.
    pub status: UserStatus,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }
}

/// Data required to create a new user.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Desired username.
    pub username: String,
    /// Initial plaintext password; hashed before it reaches the store.
    pub password: String,
    /// Email address (optional).
    #[serde(default)]
    pub email: Option<String>,
    /// Description (optional).
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status; active when omitted.
    #[serde(default)]
    pub status: Option<UserStatus>,
}

impl NewUser {
    /// Creates a request with only the required fields.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
            description: None,
            status: None,
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("description", &self.description)
            .field("status", &self.status)
            .finish()
    }
}

/// Data for updating an existing user's profile.
///
/// `username` and `password` exist only so that a payload carrying them can
/// be rejected; the profile update path never writes either.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    /// The user ID to update.
    pub id: UserId,
    /// Must be absent or equal to the stored username.
    #[serde(default)]
    pub username: Option<String>,
    /// Must be absent or empty.
    #[serde(default)]
    pub password: Option<String>,
    /// New email; an empty string clears it.
    #[serde(default)]
    pub email: Option<String>,
    /// New description; an empty string clears it.
    #[serde(default)]
    pub description: Option<String>,
    /// New status.
    #[serde(default)]
    pub status: Option<UserStatus>,
}

impl UpdateUser {
    /// Creates an update for `id` that changes nothing yet.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            username: None,
            password: None,
            email: None,
            description: None,
            status: None,
        }
    }
}

/// The profile fields an update may write. Has no username or credential.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// `Some(None)` clears the email.
    pub email: Option<Option<String>>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    /// New status.
    pub status: Option<UserStatus>,
}

impl ProfileUpdate {
    /// Apply the changes to a user record in place.
    pub fn apply(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(description) = &self.description {
            user.description = description.clone();
        }
        if let Some(status) = self.status {
            user.status = status;
        }
    }
}

impl From<&UpdateUser> for ProfileUpdate {
    fn from(update: &UpdateUser) -> Self {
        fn clearable(value: &Option<String>) -> Option<Option<String>> {
            value.as_ref().map(|v| {
                let v = v.trim();
                (!v.is_empty()).then(|| v.to_string())
            })
        }
        Self {
            email: clearable(&update.email),
            description: clearable(&update.description),
            status: update.status,
        }
    }
}

impl std::fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("description", &self.description)
            .field("status", &self.status)
            .finish()
    }
}
