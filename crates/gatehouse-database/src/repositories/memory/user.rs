//! [`UserRepository`] for [`MemoryStore`].

use async_trait::async_trait;
use chrono::Utc;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::user::{Credential, NewUser, ProfileUpdate, User};

use super::{MemoryStore, next};
use crate::repositories::UserRepository;

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new: &NewUser, password_hash: &str) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let wanted = new.username.to_lowercase();
        if tables
            .users
            .values()
            .any(|u| u.username.to_lowercase() == wanted)
        {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                new.username
            )));
        }

        let id = UserId(next(&mut tables.sequences.user));
        let now = Utc::now();
        let user = User {
            id,
            username: new.username.clone(),
            email: new.email.clone(),
            description: new.description.clone(),
            status: new.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, user.clone());
        tables.credentials.insert(
            id,
            Credential {
                user_id: id,
                password_hash: password_hash.to_string(),
                updated_at: now,
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let wanted = username.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn update_profile(&self, id: UserId, profile: &ProfileUpdate) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        profile.apply(user);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.credentials.remove(&id);
        tables.user_roles.remove(&id);
        tables.sessions.retain(|_, s| s.user_id != id);
        Ok(true)
    }

    async fn find_credential(&self, id: UserId) -> AppResult<Option<Credential>> {
        Ok(self.tables.read().await.credentials.get(&id).cloned())
    }

    async fn update_credential(&self, id: UserId, password_hash: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let credential = tables
            .credentials
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        credential.password_hash = password_hash.to_string();
        credential.updated_at = Utc::now();
        Ok(())
    }
}
