//! Server-side session records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::session::{NewSession, Session, TerminationReason};

/// Storage for login sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync + std::fmt::Debug {
    /// Record a session. `NotFound` if the user no longer exists.
    async fn create(&self, new: &NewSession) -> AppResult<Session>;

    /// Find a session by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Sessions of the user that are neither terminated nor expired.
    async fn find_active_by_user(&self, user_id: UserId) -> AppResult<Vec<Session>>;

    /// Mark one session terminated. Returns `false` if it was absent or
    /// already terminated.
    async fn terminate(&self, id: Uuid, reason: TerminationReason) -> AppResult<bool>;

    /// Terminate every active session of the user and return them.
    async fn terminate_all_for_user(
        &self,
        user_id: UserId,
        reason: TerminationReason,
    ) -> AppResult<Vec<Session>>;

    /// Delete sessions that expired or were terminated before `before`.
    /// Returns the number of rows removed.
    async fn delete_inactive_before(&self, before: DateTime<Utc>) -> AppResult<u64>;
}
