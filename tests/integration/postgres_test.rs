//! The sqlx repositories against a live PostgreSQL database.
//!
//! Every test returns early unless `GATEHOUSE_TEST_DATABASE_URL` is set.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use gatehouse_core::error::ErrorKind;
use gatehouse_core::types::{ButtonId, MenuId, RoleId, UserId};
use gatehouse_entity::grant::RolePermissions;
use gatehouse_entity::menu::{Button, Menu, NewButton, NewMenu};
use gatehouse_entity::role::NewRole;
use gatehouse_entity::session::NewSession;
use gatehouse_entity::user::{NewUser, User};

use crate::helpers::{PASSWORD, PgTestApp, unique};

/// Far above anything an identity column hands out during a test run.
const MISSING: i64 = i64::MAX - 7;

async fn user(app: &PgTestApp) -> User {
    app.repos
        .users
        .create(&NewUser::new(unique("pg_user"), ""), "hash")
        .await
        .expect("Failed to create user")
}

async fn role(app: &PgTestApp) -> RoleId {
    app.repos
        .roles
        .create(&NewRole {
            name: unique("pg_role"),
            description: None,
        })
        .await
        .expect("Failed to create role")
        .id
}

async fn menu(app: &PgTestApp, parent: Option<MenuId>) -> Menu {
    let name = unique("menu");
    let mut new = NewMenu::new(name.clone(), format!("/{name}"));
    new.parent_id = parent;
    app.repos
        .menus
        .create_menu(&new)
        .await
        .expect("Failed to create menu")
}

async fn button(app: &PgTestApp, menu_id: MenuId, code: &str) -> Button {
    app.repos
        .menus
        .create_button(&NewButton::new(menu_id, code, code))
        .await
        .expect("Failed to create button")
}

async fn role_ids(app: &PgTestApp, user_id: UserId) -> Vec<RoleId> {
    app.repos
        .assignments
        .roles_for_user(user_id)
        .await
        .expect("roles")
        .expect("user exists")
        .into_iter()
        .map(|r| r.id)
        .collect()
}

fn session_for(user_id: UserId, expires_in: Duration) -> NewSession {
    NewSession {
        id: Uuid::now_v7(),
        user_id,
        token_hash: "digest".into(),
        expires_at: Utc::now() + expires_in,
    }
}

#[tokio::test]
async fn test_pg_replace_user_roles_is_all_or_nothing() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let u = user(&app).await;
    let (r1, r2, r3) = (role(&app).await, role(&app).await, role(&app).await);

    app.repos
        .assignments
        .replace_user_roles(u.id, &[r1])
        .await
        .expect("assign");

    let err = app
        .repos
        .assignments
        .replace_user_roles(u.id, &[r2, RoleId(MISSING), RoleId(MISSING - 1)])
        .await
        .expect_err("unknown role");
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert!(err.message.contains(&MISSING.to_string()));
    assert_eq!(role_ids(&app, u.id).await, vec![r1]);

    app.repos
        .assignments
        .replace_user_roles(u.id, &[r3, r2, r3])
        .await
        .expect("replace");
    let mut expected = vec![r2, r3];
    expected.sort();
    assert_eq!(role_ids(&app, u.id).await, expected);

    let err = app
        .repos
        .assignments
        .replace_user_roles(UserId(MISSING), &[r1])
        .await
        .expect_err("unknown user");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_pg_replace_permissions_is_all_or_nothing() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let r = role(&app).await;
    let (m1, m2) = (menu(&app, None).await, menu(&app, None).await);
    let b1 = button(&app, m1.id, "view").await;
    let b2 = button(&app, m2.id, "edit").await;

    let holders = app
        .repos
        .roles
        .replace_permissions(r, &RolePermissions::new([m1.id], [b1.id]))
        .await
        .expect("grant");
    assert!(holders.is_empty());

    // b1 sits on m1, which this replacement no longer grants.
    let err = app
        .repos
        .roles
        .replace_permissions(r, &RolePermissions::new([m2.id], [b2.id, b1.id]))
        .await
        .expect_err("button outside granted menus");
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let err = app
        .repos
        .roles
        .replace_permissions(r, &RolePermissions::new([m2.id, MenuId(MISSING)], []))
        .await
        .expect_err("unknown menu");
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert!(err.message.contains(&MISSING.to_string()));

    let err = app
        .repos
        .roles
        .replace_permissions(r, &RolePermissions::new([m2.id], [ButtonId(MISSING)]))
        .await
        .expect_err("unknown button");
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let menus = app.repos.roles.menus_for_role(r).await.expect("menus").expect("role");
    assert_eq!(menus.iter().map(|m| m.id).collect::<Vec<_>>(), vec![m1.id]);
    let buttons = app
        .repos
        .roles
        .buttons_for_role_and_menu(r, m1.id)
        .await
        .expect("buttons")
        .expect("role");
    assert_eq!(buttons.iter().map(|b| b.id).collect::<Vec<_>>(), vec![b1.id]);

    app.repos
        .roles
        .replace_permissions(r, &RolePermissions::new([m2.id, m2.id], [b2.id]))
        .await
        .expect("replace");
    let menus = app.repos.roles.menus_for_role(r).await.expect("menus").expect("role");
    assert_eq!(menus.iter().map(|m| m.id).collect::<Vec<_>>(), vec![m2.id]);

    let err = app
        .repos
        .roles
        .replace_permissions(RoleId(MISSING), &RolePermissions::default())
        .await
        .expect_err("unknown role");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_pg_grant_snapshot_groups_grants_by_role() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let u = user(&app).await;
    let (ra, rb) = (role(&app).await, role(&app).await);
    let (shared, only_b) = (menu(&app, None).await, menu(&app, None).await);
    let view = button(&app, shared.id, "view").await;

    app.repos
        .roles
        .replace_permissions(ra, &RolePermissions::new([shared.id], [view.id]))
        .await
        .expect("grant a");
    app.repos
        .roles
        .replace_permissions(rb, &RolePermissions::new([shared.id, only_b.id], []))
        .await
        .expect("grant b");
    app.repos
        .assignments
        .replace_user_roles(u.id, &[rb, ra])
        .await
        .expect("assign");

    let snapshot = app
        .repos
        .assignments
        .grant_snapshot(u.id)
        .await
        .expect("snapshot")
        .expect("user exists");
    assert_eq!(snapshot.user_id, u.id);
    assert_eq!(
        snapshot.roles.iter().map(|g| g.role.id).collect::<Vec<_>>(),
        vec![ra.min(rb), ra.max(rb)]
    );
    let grant_a = snapshot.roles.iter().find(|g| g.role.id == ra).expect("role a");
    assert_eq!(grant_a.menus.iter().map(|m| m.id).collect::<Vec<_>>(), vec![shared.id]);
    assert_eq!(grant_a.buttons.iter().map(|b| b.id).collect::<Vec<_>>(), vec![view.id]);
    let grant_b = snapshot.roles.iter().find(|g| g.role.id == rb).expect("role b");
    assert_eq!(grant_b.menus.len(), 2);
    assert!(grant_b.buttons.is_empty());

    assert!(
        app.repos
            .assignments
            .grant_snapshot(UserId(MISSING))
            .await
            .expect("snapshot")
            .is_none()
    );
}

#[tokio::test]
async fn test_pg_snapshot_never_mixes_concurrent_reassignments() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let u = user(&app).await;
    let (left, right) = (role(&app).await, role(&app).await);
    let (m_left, m_right) = (menu(&app, None).await, menu(&app, None).await);
    app.repos
        .roles
        .replace_permissions(left, &RolePermissions::new([m_left.id], []))
        .await
        .expect("grant");
    app.repos
        .roles
        .replace_permissions(right, &RolePermissions::new([m_right.id], []))
        .await
        .expect("grant");

    let user_id = u.id;
    let assignments = Arc::clone(&app.repos.assignments);
    let writer = tokio::spawn(async move {
        for i in 0..40 {
            let roles = if i % 2 == 0 { [left] } else { [right] };
            assignments
                .replace_user_roles(user_id, &roles)
                .await
                .expect("assign");
        }
    });

    for _ in 0..40 {
        let snapshot = app
            .repos
            .assignments
            .grant_snapshot(u.id)
            .await
            .expect("snapshot")
            .expect("user exists");
        assert!(snapshot.roles.len() <= 1);
        for grant in &snapshot.roles {
            let expected = if grant.role.id == left { m_left.id } else { m_right.id };
            assert_eq!(grant.menus.iter().map(|m| m.id).collect::<Vec<_>>(), vec![expected]);
        }
    }
    writer.await.expect("writer");
}

#[tokio::test]
async fn test_pg_constraint_violations_map_to_error_kinds() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let u = user(&app).await;
    let err = app
        .repos
        .users
        .create(&NewUser::new(u.username.to_uppercase(), ""), "hash")
        .await
        .expect_err("duplicate username");
    assert_eq!(err.kind, ErrorKind::Conflict);

    let name = unique("pg_role");
    let new_role = NewRole {
        name: name.clone(),
        description: None,
    };
    app.repos.roles.create(&new_role).await.expect("role");
    let err = app.repos.roles.create(&new_role).await.expect_err("duplicate role");
    assert_eq!(err.kind, ErrorKind::Conflict);

    let m = menu(&app, None).await;
    button(&app, m.id, "export").await;
    let err = app
        .repos
        .menus
        .create_button(&NewButton::new(m.id, "export", "Export again"))
        .await
        .expect_err("duplicate code");
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = app
        .repos
        .menus
        .create_button(&NewButton::new(MenuId(MISSING), "view", "View"))
        .await
        .expect_err("missing menu");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .repos
        .menus
        .create_menu(&NewMenu::new("Orphan", "/orphan").with_parent(MenuId(MISSING)))
        .await
        .expect_err("missing parent");
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let err = app
        .repos
        .sessions
        .create(&session_for(UserId(MISSING), Duration::minutes(5)))
        .await
        .expect_err("missing user");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_pg_user_delete_cascades_roles_and_sessions() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let u = user(&app).await;
    let r = role(&app).await;
    app.repos
        .assignments
        .replace_user_roles(u.id, &[r])
        .await
        .expect("assign");
    let session = app
        .repos
        .sessions
        .create(&session_for(u.id, Duration::minutes(5)))
        .await
        .expect("session");

    assert!(app.repos.users.delete(u.id).await.expect("delete"));
    assert!(!app.repos.users.delete(u.id).await.expect("second delete"));

    assert!(app.repos.assignments.roles_for_user(u.id).await.expect("roles").is_none());
    assert!(app.repos.sessions.find_by_id(session.id).await.expect("find").is_none());
    assert!(app.repos.roles.holders(r).await.expect("holders").is_empty());
}

#[tokio::test]
async fn test_pg_role_and_menu_delete_cascade_grants() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let u = user(&app).await;
    let (doomed, keeper) = (role(&app).await, role(&app).await);
    let parent = menu(&app, None).await;
    let child = menu(&app, Some(parent.id)).await;
    let edit = button(&app, child.id, "edit").await;

    app.repos
        .roles
        .replace_permissions(keeper, &RolePermissions::new([parent.id, child.id], [edit.id]))
        .await
        .expect("grant");
    app.repos
        .assignments
        .replace_user_roles(u.id, &[doomed, keeper])
        .await
        .expect("assign");

    let holders = app.repos.roles.delete(doomed).await.expect("delete role");
    assert_eq!(holders, Some(vec![u.id]));
    assert_eq!(role_ids(&app, u.id).await, vec![keeper]);
    assert_eq!(app.repos.roles.delete(doomed).await.expect("again"), None);

    let err = app
        .repos
        .menus
        .delete_menu(parent.id)
        .await
        .expect_err("has children");
    assert_eq!(err.kind, ErrorKind::Conflict);

    assert!(app.repos.menus.delete_menu(child.id).await.expect("delete child"));
    assert!(app.repos.menus.find_button(edit.id).await.expect("button").is_none());
    let menus = app
        .repos
        .roles
        .menus_for_role(keeper)
        .await
        .expect("menus")
        .expect("role");
    assert_eq!(menus.iter().map(|m| m.id).collect::<Vec<_>>(), vec![parent.id]);
    assert!(
        app.repos
            .roles
            .buttons_for_role_and_menu(keeper, child.id)
            .await
            .expect("buttons")
            .expect("role")
            .is_empty()
    );
}

#[tokio::test]
async fn test_pg_purge_removes_only_old_inactive_sessions() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let u = user(&app).await;
    let stale = app
        .repos
        .sessions
        .create(&session_for(u.id, Duration::hours(-100)))
        .await
        .expect("stale");
    let live = app
        .repos
        .sessions
        .create(&session_for(u.id, Duration::hours(1)))
        .await
        .expect("live");

    let removed = app
        .repos
        .sessions
        .delete_inactive_before(Utc::now() - Duration::hours(72))
        .await
        .expect("purge");
    assert!(removed >= 1);
    assert!(app.repos.sessions.find_by_id(stale.id).await.expect("find").is_none());
    assert!(app.repos.sessions.find_by_id(live.id).await.expect("find").is_some());
}

#[tokio::test]
async fn test_pg_deleted_user_token_stops_resolving() {
    let Some(app) = PgTestApp::connect().await else {
        return;
    };
    let username = unique("pg_login");
    let created = app
        .registry
        .users
        .create(NewUser::new(username.clone(), PASSWORD))
        .await
        .expect("create");
    let login = app
        .registry
        .sessions
        .login(&username, PASSWORD)
        .await
        .expect("login");
    assert_eq!(
        app.registry.sessions.resolve(&login.token).await.expect("resolve"),
        created.id
    );

    app.registry.users.delete(created.id).await.expect("delete");

    let err = app
        .registry
        .sessions
        .resolve(&login.token)
        .await
        .expect_err("deleted user");
    assert_eq!(err.kind, ErrorKind::Unauthenticated);
    let err = app
        .registry
        .assignments
        .get_roles_for_user(created.id)
        .await
        .expect_err("deleted user");
    assert_eq!(err.kind, ErrorKind::NotFound);
}
