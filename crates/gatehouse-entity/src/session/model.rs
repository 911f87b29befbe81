//! Session entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use gatehouse_core::types::UserId;

/// A server-side login session.
///
/// Created on login and ended by logout, user deletion, or expiry. The
/// bearer token itself is never stored, only its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier (UUID v7, carried in the token as `sid`).
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: UserId,
    /// Hex-encoded SHA-256 of the issued token.
    pub token_hash: String,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the session expires (absolute timeout).
    pub expires_at: DateTime<Utc>,
    /// When the session was terminated, if it was.
    pub terminated_at: Option<DateTime<Utc>>,
    /// Why the session was terminated.
    pub terminated_reason: Option<String>,
}

impl Session {
    /// Not terminated and not yet expired at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.terminated_at.is_none() && self.expires_at > now
    }

    /// Check whether the session is still active right now.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Check whether the session has been terminated.
    pub fn is_terminated(&self) -> bool {
        self.terminated_at.is_some()
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Seconds until expiry, zero once expired.
    pub fn remaining_seconds(&self) -> u64 {
        (self.expires_at - Utc::now()).num_seconds().max(0) as u64
    }
}

/// Data required to record a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Pre-generated session ID, embedded in the token before the row exists.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Hex-encoded SHA-256 of the token.
    pub token_hash: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Why a session was ended before its expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The holder logged out.
    Logout,
    /// An administrator revoked every session of the user.
    Revoked,
}

impl TerminationReason {
    /// Stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logout => "logout",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
