//! Role assignment.

use gatehouse_core::error::ErrorKind;
use gatehouse_core::types::{RoleId, UserId};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_second_assignment_replaces_first() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let r1 = app.create_role("r1").await;
    let r2 = app.create_role("r2").await;
    let r3 = app.create_role("r3").await;

    app.registry
        .assignments
        .set_user_roles(user.id, &[r1, r2])
        .await
        .expect("first");
    app.registry
        .assignments
        .set_user_roles(user.id, &[r3])
        .await
        .expect("second");

    let roles = app
        .registry
        .assignments
        .get_roles_for_user(user.id)
        .await
        .expect("roles");
    assert_eq!(roles.iter().map(|r| r.id).collect::<Vec<_>>(), vec![r3]);
}

#[tokio::test]
async fn test_repeated_role_is_a_noop() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let r1 = app.create_role("r1").await;

    app.registry
        .assignments
        .set_user_roles(user.id, &[r1, r1, r1])
        .await
        .expect("assign");
    let roles = app
        .registry
        .assignments
        .get_roles_for_user(user.id)
        .await
        .expect("roles");
    assert_eq!(roles.len(), 1);
}

#[tokio::test]
async fn test_unknown_role_leaves_previous_set() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let r1 = app.create_role("r1").await;
    app.registry
        .assignments
        .set_user_roles(user.id, &[r1])
        .await
        .expect("assign");

    let err = app
        .registry
        .assignments
        .set_user_roles(user.id, &[r1, RoleId(777), RoleId(778)])
        .await
        .expect_err("unknown role");
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert!(err.message.contains("777"));

    let roles = app
        .registry
        .assignments
        .get_roles_for_user(user.id)
        .await
        .expect("roles");
    assert_eq!(roles.iter().map(|r| r.id).collect::<Vec<_>>(), vec![r1]);
}

#[tokio::test]
async fn test_unknown_user() {
    let app = TestApp::new();
    let r1 = app.create_role("r1").await;
    let err = app
        .registry
        .assignments
        .set_user_roles(UserId(31337), &[r1])
        .await
        .expect_err("unknown user");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_role_deletion_removes_assignment() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let r1 = app.create_role("r1").await;
    let r2 = app.create_role("r2").await;
    app.registry
        .assignments
        .set_user_roles(user.id, &[r1, r2])
        .await
        .expect("assign");

    app.registry.roles.delete_role(r1).await.expect("delete role");
    let roles = app
        .registry
        .assignments
        .get_roles_for_user(user.id)
        .await
        .expect("roles");
    assert_eq!(roles.iter().map(|r| r.id).collect::<Vec<_>>(), vec![r2]);
}
