//! User lifecycle across the directory, assignments, and sessions.

use gatehouse_core::error::ErrorKind;
use gatehouse_core::types::UserId;
use gatehouse_entity::user::{NewUser, PasswordChange, UpdateUser};

use crate::helpers::{OTHER_PASSWORD, PASSWORD, TestApp};

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new();
    app.create_user("alice").await;
    let err = app
        .registry
        .users
        .create(NewUser::new("Alice", PASSWORD))
        .await
        .expect_err("duplicate");
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_update_never_changes_username_or_credential() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;

    let mut attempt = UpdateUser::new(user.id);
    attempt.username = Some("eve".into());
    attempt.description = Some("should not land".into());
    let err = app.registry.users.update(attempt).await.expect_err("rename");
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let mut attempt = UpdateUser::new(user.id);
    attempt.password = Some(OTHER_PASSWORD.into());
    let err = app.registry.users.update(attempt).await.expect_err("repassword");
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let mut profile = UpdateUser::new(user.id);
    profile.description = Some("operator".into());
    let updated = app.registry.users.update(profile).await.expect("profile");
    assert_eq!(updated.username, "alice");
    assert_eq!(updated.description.as_deref(), Some("operator"));
    assert!(updated.updated_at >= user.updated_at);

    let stored = app.registry.users.get(user.id).await.expect("get");
    assert_eq!(stored.username, "alice");
    app.login("alice").await;
    assert!(
        app.registry
            .sessions
            .login("alice", OTHER_PASSWORD)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_change_password_for_someone_else_is_forbidden() {
    let app = TestApp::new();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;

    // Correct current password for the target does not help.
    let change = PasswordChange {
        user_id: alice.id,
        current_password: PASSWORD.into(),
        new_password: OTHER_PASSWORD.into(),
        confirm_password: OTHER_PASSWORD.into(),
    };
    let err = app
        .registry
        .users
        .change_password(bob.id, &change)
        .await
        .expect_err("forbidden");
    assert_eq!(err.kind, ErrorKind::Forbidden);
    app.login("alice").await;
}

#[tokio::test]
async fn test_delete_cascades_roles_and_sessions() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let role = app.create_role("staff").await;
    app.registry
        .assignments
        .set_user_roles(user.id, &[role])
        .await
        .expect("assign");
    let token = app.login("alice").await;

    app.registry.users.delete(user.id).await.expect("delete");

    let err = app
        .registry
        .assignments
        .get_roles_for_user(user.id)
        .await
        .expect_err("roles of deleted user");
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app.registry.sessions.resolve(&token).await.expect_err("token");
    assert_eq!(err.kind, ErrorKind::Unauthenticated);
    let err = app.registry.users.get(user.id).await.expect_err("get");
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Ids are never reused.
    let again = app.create_user("alice").await;
    assert_ne!(again.id, user.id);
}

#[tokio::test]
async fn test_list_never_exposes_credentials() {
    let app = TestApp::new();
    app.create_user("alice").await;
    app.create_user("bob").await;

    let users = app.registry.users.list().await.expect("list");
    assert_eq!(users.len(), 2);
    let json = serde_json::to_string(&users).expect("serialize");
    assert!(!json.contains("argon2"));
    assert!(!json.contains(PASSWORD));
}

#[tokio::test]
async fn test_get_missing_user() {
    let app = TestApp::new();
    let err = app.registry.users.get(UserId(12345)).await.expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
}
