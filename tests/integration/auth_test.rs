//! Login, token resolution, and logout.

use gatehouse_core::error::ErrorKind;
use gatehouse_entity::user::{PasswordChange, UpdateUser, UserStatus};

use crate::helpers::{OTHER_PASSWORD, PASSWORD, TestApp};

#[tokio::test]
async fn test_create_login_resolve() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let token = app.login("alice").await;

    let resolved = app.registry.sessions.resolve(&token).await.expect("resolve");
    assert_eq!(resolved, user.id);

    let bearer = app
        .registry
        .sessions
        .resolve_bearer(&format!("Bearer {token}"))
        .await
        .expect("bearer");
    assert_eq!(bearer, user.id);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let app = TestApp::new();
    app.create_user("alice").await;

    let wrong = app
        .registry
        .sessions
        .login("alice", OTHER_PASSWORD)
        .await
        .expect_err("wrong password");
    let unknown = app
        .registry
        .sessions
        .login("nobody", PASSWORD)
        .await
        .expect_err("unknown user");

    assert_eq!(wrong.kind, ErrorKind::InvalidCredential);
    assert_eq!(unknown.kind, ErrorKind::InvalidCredential);
    assert_eq!(wrong.message, unknown.message);
}

#[tokio::test]
async fn test_logout_invalidates_token_and_is_idempotent() {
    let app = TestApp::new();
    app.create_user("alice").await;
    let token = app.login("alice").await;
    let other = app.login("alice").await;

    app.registry.sessions.logout(&token).await.expect("logout");
    app.registry.sessions.logout(&token).await.expect("second logout");

    let err = app.registry.sessions.resolve(&token).await.expect_err("logged out");
    assert_eq!(err.kind, ErrorKind::Unauthenticated);
    app.registry
        .sessions
        .resolve(&other)
        .await
        .expect("other session unaffected");
}

#[tokio::test]
async fn test_missing_or_malformed_token() {
    let app = TestApp::new();
    for token in ["", "not-a-jwt", "a.b.c"] {
        let err = app.registry.sessions.resolve(token).await.expect_err("invalid");
        assert_eq!(err.kind, ErrorKind::Unauthenticated);
    }
    let err = app
        .registry
        .sessions
        .resolve_bearer("Token abc")
        .await
        .expect_err("wrong scheme");
    assert_eq!(err.kind, ErrorKind::Unauthenticated);
}

#[tokio::test]
async fn test_inactive_user_cannot_log_in() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let mut update = UpdateUser::new(user.id);
    update.status = Some(UserStatus::Inactive);
    app.registry.users.update(update).await.expect("deactivate");

    let err = app
        .registry
        .sessions
        .login("alice", PASSWORD)
        .await
        .expect_err("inactive");
    assert_eq!(err.kind, ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_password_change_keeps_sessions_and_swaps_credential() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let token = app.login("alice").await;

    app.registry
        .users
        .change_password(
            user.id,
            &PasswordChange {
                user_id: user.id,
                current_password: PASSWORD.into(),
                new_password: OTHER_PASSWORD.into(),
                confirm_password: OTHER_PASSWORD.into(),
            },
        )
        .await
        .expect("change");

    app.registry.sessions.resolve(&token).await.expect("still valid");
    assert!(app.registry.sessions.login("alice", PASSWORD).await.is_err());
    app.registry
        .sessions
        .login("alice", OTHER_PASSWORD)
        .await
        .expect("new password");
}

#[tokio::test]
async fn test_purge_keeps_live_sessions() {
    let app = TestApp::new();
    app.create_user("alice").await;
    let token = app.login("alice").await;

    let removed = app
        .registry
        .session_cleanup
        .purge_expired()
        .await
        .expect("purge");
    assert_eq!(removed, 0);
    app.registry.sessions.resolve(&token).await.expect("live");
}
