//! [`SessionRepository`] for [`MemoryStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::UserId;
use gatehouse_entity::session::{NewSession, Session, TerminationReason};

use super::MemoryStore;
use crate::repositories::SessionRepository;

fn end(session: &mut Session, reason: TerminationReason, at: DateTime<Utc>) {
    session.terminated_at = Some(at);
    session.terminated_reason = Some(reason.as_str().to_string());
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(&self, new: &NewSession) -> AppResult<Session> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&new.user_id) {
            return Err(AppError::not_found(format!(
                "User {} not found",
                new.user_id
            )));
        }
        let session = Session {
            id: new.id,
            user_id: new.user_id,
            token_hash: new.token_hash.clone(),
            created_at: Utc::now(),
            expires_at: new.expires_at,
            terminated_at: None,
            terminated_reason: None,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(&id).cloned())
    }

    async fn find_active_by_user(&self, user_id: UserId) -> AppResult<Vec<Session>> {
        let now = Utc::now();
        let mut sessions: Vec<Session> = self
            .tables
            .read()
            .await
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active_at(now))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn terminate(&self, id: Uuid, reason: TerminationReason) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.sessions.get_mut(&id) {
            Some(session) if !session.is_terminated() => {
                end(session, reason, Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn terminate_all_for_user(
        &self,
        user_id: UserId,
        reason: TerminationReason,
    ) -> AppResult<Vec<Session>> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let mut ended = Vec::new();
        for session in tables.sessions.values_mut() {
            if session.user_id == user_id && session.is_active_at(now) {
                end(session, reason, now);
                ended.push(session.clone());
            }
        }
        Ok(ended)
    }

    async fn delete_inactive_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let count = tables.sessions.len();
        tables.sessions.retain(|_, s| {
            s.expires_at >= before && s.terminated_at.is_none_or(|at| at >= before)
        });
        Ok((count - tables.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use gatehouse_entity::user::NewUser;

    use super::*;
    use crate::repositories::UserRepository;

    async fn open(store: &MemoryStore, user_id: UserId, ttl: Duration) -> Session {
        SessionRepository::create(
            store,
            &NewSession {
                id: Uuid::now_v7(),
                user_id,
                token_hash: "digest".into(),
                expires_at: Utc::now() + ttl,
            },
        )
        .await
        .expect("session")
    }

    #[tokio::test]
    async fn test_terminate_all_only_touches_active_sessions() {
        let store = MemoryStore::new();
        let user = UserRepository::create(&store, &NewUser::new("alice", ""), "hash")
            .await
            .expect("user");
        let live = open(&store, user.id, Duration::minutes(10)).await;
        open(&store, user.id, Duration::minutes(-10)).await;

        let ended = store
            .terminate_all_for_user(user.id, TerminationReason::Revoked)
            .await
            .expect("terminate");
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0].id, live.id);
        assert!(
            !store
                .terminate(live.id, TerminationReason::Logout)
                .await
                .expect("terminate again")
        );
    }

    #[tokio::test]
    async fn test_delete_inactive_before_keeps_live_sessions() {
        let store = MemoryStore::new();
        let user = UserRepository::create(&store, &NewUser::new("alice", ""), "hash")
            .await
            .expect("user");
        let live = open(&store, user.id, Duration::minutes(10)).await;
        open(&store, user.id, Duration::hours(-5)).await;

        let removed = store
            .delete_inactive_before(Utc::now() - Duration::hours(1))
            .await
            .expect("purge");
        assert_eq!(removed, 1);
        assert!(SessionRepository::find_by_id(&store, live.id)
            .await
            .expect("lookup")
            .is_some());
    }

    #[tokio::test]
    async fn test_session_for_missing_user_is_rejected() {
        let store = MemoryStore::new();
        let err = SessionRepository::create(
            &store,
            &NewSession {
                id: Uuid::now_v7(),
                user_id: UserId(3),
                token_hash: "digest".into(),
                expires_at: Utc::now(),
            },
        )
        .await
        .expect_err("no user");
        assert!(err.is(gatehouse_core::error::ErrorKind::NotFound));
    }
}
