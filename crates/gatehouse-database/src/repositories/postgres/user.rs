//! [`UserRepository`] over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::user::{Credential, NewUser, ProfileUpdate, User};

use super::{db_error, map_db_error};
use crate::repositories::UserRepository;

/// Columns of the public user record; excludes the credential.
const USER_COLUMNS: &str = "id, username, email, description, status, created_at, updated_at";

/// User repository backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new: &NewUser, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, email, description, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(&new.username)
        .bind(password_hash)
        .bind(&new.email)
        .bind(&new.description)
        .bind(new.status.unwrap_or_default())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Username already exists"))
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find user by username"))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list users"))
    }

    async fn update_profile(&self, id: UserId, profile: &ProfileUpdate) -> AppResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let mut user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to load user"))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        profile.apply(&mut user);

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET email = $2, description = $3, status = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&user.email)
        .bind(&user.description)
        .bind(user.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update user"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit user update"))?;
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        // user_roles and sessions go with the row through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_credential(&self, id: UserId) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, Credential>(
            "SELECT id AS user_id, password_hash, credential_updated_at AS updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load credential"))
    }

    async fn update_credential(&self, id: UserId, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, credential_updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update credential"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }
}
