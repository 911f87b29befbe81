//! [`AssignmentRepository`] for [`MemoryStore`].

use std::collections::BTreeSet;

use async_trait::async_trait;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{RoleId, UserId};
use gatehouse_entity::grant::{GrantSnapshot, RoleGrant};
use gatehouse_entity::role::Role;

use super::MemoryStore;
use crate::repositories::AssignmentRepository;

#[async_trait]
impl AssignmentRepository for MemoryStore {
    async fn roles_for_user(&self, user_id: UserId) -> AppResult<Option<Vec<Role>>> {
        let tables = self.tables.read().await;
        if !tables.users.contains_key(&user_id) {
            return Ok(None);
        }
        let roles = tables
            .user_roles
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.roles.get(id).cloned())
            .collect();
        Ok(Some(roles))
    }

    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        if let Some(missing) = role_ids.iter().find(|id| !tables.roles.contains_key(*id)) {
            return Err(AppError::invalid_input(format!(
                "Role {missing} does not exist"
            )));
        }
        let roles: BTreeSet<RoleId> = role_ids.iter().copied().collect();
        if roles.is_empty() {
            tables.user_roles.remove(&user_id);
        } else {
            tables.user_roles.insert(user_id, roles);
        }
        Ok(())
    }

    async fn grant_snapshot(&self, user_id: UserId) -> AppResult<Option<GrantSnapshot>> {
        let tables = self.tables.read().await;
        if !tables.users.contains_key(&user_id) {
            return Ok(None);
        }
        let roles = tables
            .user_roles
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| tables.roles.get(id))
            .map(|role| RoleGrant {
                role: role.clone(),
                menus: tables.role_menus(role.id),
                buttons: tables.role_buttons(role.id),
            })
            .collect();
        Ok(Some(GrantSnapshot { user_id, roles }))
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::error::ErrorKind;
    use gatehouse_entity::role::NewRole;
    use gatehouse_entity::user::NewUser;

    use super::*;
    use crate::repositories::{RoleRepository, UserRepository};

    async fn seed(store: &MemoryStore) -> (UserId, Vec<RoleId>) {
        let user = UserRepository::create(store, &NewUser::new("alice", ""), "hash")
            .await
            .expect("user");
        let mut roles = Vec::new();
        for name in ["r1", "r2", "r3"] {
            let role = RoleRepository::create(
                store,
                &NewRole {
                    name: name.into(),
                    description: None,
                },
            )
            .await
            .expect("role");
            roles.push(role.id);
        }
        (user.id, roles)
    }

    fn ids(roles: Vec<Role>) -> Vec<RoleId> {
        roles.into_iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_replace_user_roles_replaces_set() {
        let store = MemoryStore::new();
        let (user, roles) = seed(&store).await;
        store
            .replace_user_roles(user, &[roles[0], roles[1], roles[0]])
            .await
            .expect("assign");
        store
            .replace_user_roles(user, &[roles[2]])
            .await
            .expect("reassign");
        let current = store
            .roles_for_user(user)
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(ids(current), vec![roles[2]]);
    }

    #[tokio::test]
    async fn test_unknown_role_leaves_assignment_untouched() {
        let store = MemoryStore::new();
        let (user, roles) = seed(&store).await;
        store
            .replace_user_roles(user, &[roles[0]])
            .await
            .expect("assign");
        let err = store
            .replace_user_roles(user, &[roles[1], RoleId(50), RoleId(60)])
            .await
            .expect_err("unknown role");
        assert!(err.is(ErrorKind::InvalidInput));
        assert!(err.message.contains("50"));
        let current = store
            .roles_for_user(user)
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(ids(current), vec![roles[0]]);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = MemoryStore::new();
        let err = store
            .replace_user_roles(UserId(8), &[])
            .await
            .expect_err("missing user");
        assert!(err.is(ErrorKind::NotFound));
        assert!(store.grant_snapshot(UserId(8)).await.expect("read").is_none());
    }
}
