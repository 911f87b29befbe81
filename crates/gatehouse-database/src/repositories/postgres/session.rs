//! [`SessionRepository`] over PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::session::{NewSession, Session, TerminationReason};

use super::db_error;
use crate::repositories::SessionRepository;

/// Session repository backed by the `sessions` table.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, new: &NewSession) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(new.id)
        .bind(new.user_id)
        .bind(&new.token_hash)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let missing_user = e
                .as_database_error()
                .is_some_and(|d| d.is_foreign_key_violation());
            if missing_user {
                AppError::not_found(format!("User {} not found", new.user_id))
            } else {
                db_error("Failed to create session")(e)
            }
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find session"))
    }

    async fn find_active_by_user(&self, user_id: UserId) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE user_id = $1 AND terminated_at IS NULL \
             AND expires_at > NOW() ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to find active sessions"))
    }

    async fn terminate(&self, id: Uuid, reason: TerminationReason) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET terminated_at = NOW(), terminated_reason = $2 \
             WHERE id = $1 AND terminated_at IS NULL",
        )
        .bind(id)
        .bind(reason.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to terminate session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn terminate_all_for_user(
        &self,
        user_id: UserId,
        reason: TerminationReason,
    ) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "UPDATE sessions SET terminated_at = NOW(), terminated_reason = $2 \
             WHERE user_id = $1 AND terminated_at IS NULL AND expires_at > NOW() \
             RETURNING *",
        )
        .bind(user_id)
        .bind(reason.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to terminate user sessions"))
    }

    async fn delete_inactive_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE expires_at < $1 OR terminated_at < $1",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to purge sessions"))?;
        Ok(result.rows_affected())
    }
}
