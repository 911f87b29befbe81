//! Permission resolution over roles, menus, and buttons.

use std::sync::Arc;

use gatehouse_entity::menu::{MenuNode, UpdateMenu};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_menu_union_has_no_duplicates() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let a = app.create_menu("A", None, 0).await;
    let b = app.create_menu("B", None, 1).await;
    let c = app.create_menu("C", None, 2).await;

    let ra = app.create_role("ab").await;
    let rb = app.create_role("bc").await;
    app.registry
        .roles
        .set_role_permissions(ra, &[a.id, b.id], &[])
        .await
        .expect("grant");
    app.registry
        .roles
        .set_role_permissions(rb, &[b.id, c.id], &[])
        .await
        .expect("grant");
    app.registry
        .assignments
        .set_user_roles(user.id, &[ra, rb])
        .await
        .expect("assign");

    let tree = app
        .registry
        .permissions
        .get_left_menus_for_user(user.id)
        .await
        .expect("menus");
    let ids: Vec<_> = tree.iter().flat_map(MenuNode::ids).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn test_tree_promotes_menus_with_ungranted_parent() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let system = app.create_menu("System", None, 0).await;
    let users = app.create_menu("Users", Some(system.id), 2).await;
    let roles = app.create_menu("Roles", Some(system.id), 1).await;
    let audit = app.create_menu("Audit", Some(users.id), 0).await;

    let role = app.create_role("viewer").await;
    app.registry
        .roles
        .set_role_permissions(role, &[users.id, roles.id, audit.id], &[])
        .await
        .expect("grant");
    app.registry
        .assignments
        .set_user_roles(user.id, &[role])
        .await
        .expect("assign");

    let tree = app
        .registry
        .permissions
        .get_left_menus_for_user(user.id)
        .await
        .expect("menus");
    // System is not granted: its children become roots, ordered by sort_order.
    assert_eq!(
        tree.iter().map(|n| n.id).collect::<Vec<_>>(),
        vec![roles.id, users.id]
    );
    assert_eq!(tree[1].children[0].id, audit.id);
}

#[tokio::test]
async fn test_buttons_on_ungranted_menu_are_empty() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let granted = app.create_menu("Granted", None, 0).await;
    let hidden = app.create_menu("Hidden", None, 0).await;
    let view = app.create_button(granted.id, "view").await;
    app.create_button(hidden.id, "purge").await;

    let role = app.create_role("viewer").await;
    app.registry
        .roles
        .set_role_permissions(role, &[granted.id], &[view.id])
        .await
        .expect("grant");
    app.registry
        .assignments
        .set_user_roles(user.id, &[role])
        .await
        .expect("assign");

    let visible = app
        .registry
        .permissions
        .get_buttons_for_user(user.id, granted.id)
        .await
        .expect("buttons");
    assert_eq!(visible.iter().map(|b| b.id).collect::<Vec<_>>(), vec![view.id]);

    let none = app
        .registry
        .permissions
        .get_buttons_for_user(user.id, hidden.id)
        .await
        .expect("buttons");
    assert!(none.is_empty());
    assert!(
        !app.registry
            .permissions
            .is_button_permitted(user.id, hidden.id, "purge")
            .await
            .expect("check")
    );
}

#[tokio::test]
async fn test_button_grant_requires_its_menu() {
    let app = TestApp::new();
    let m1 = app.create_menu("One", None, 0).await;
    let m2 = app.create_menu("Two", None, 0).await;
    let b2 = app.create_button(m2.id, "edit").await;
    let role = app.create_role("editor").await;

    let err = app
        .registry
        .roles
        .set_role_permissions(role, &[m1.id], &[b2.id])
        .await
        .expect_err("button outside granted menus");
    assert_eq!(err.kind, gatehouse_core::error::ErrorKind::InvalidInput);
    assert!(
        app.registry
            .roles
            .get_menus_for_role(role)
            .await
            .expect("menus")
            .is_empty()
    );
}

#[tokio::test]
async fn test_menu_changes_reach_cached_trees() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let a = app.create_menu("A", None, 5).await;
    let b = app.create_menu("B", None, 1).await;
    let role = app.create_role("r").await;
    app.registry
        .roles
        .set_role_permissions(role, &[a.id, b.id], &[])
        .await
        .expect("grant");
    app.registry
        .assignments
        .set_user_roles(user.id, &[role])
        .await
        .expect("assign");

    let before = app
        .registry
        .permissions
        .get_left_menus_for_user(user.id)
        .await
        .expect("menus");
    assert_eq!(before.iter().map(|n| n.id).collect::<Vec<_>>(), vec![b.id, a.id]);

    let mut update = UpdateMenu::from_menu(&a);
    update.sort_order = 0;
    app.registry.menus.update_menu(update).await.expect("reorder");

    let after = app
        .registry
        .permissions
        .get_left_menus_for_user(user.id)
        .await
        .expect("menus");
    assert_eq!(after.iter().map(|n| n.id).collect::<Vec<_>>(), vec![a.id, b.id]);
}

#[tokio::test]
async fn test_concurrent_reassignment_never_mixes_snapshots() {
    let app = TestApp::new();
    let user = app.create_user("alice").await;
    let left = app.create_menu("Left", None, 0).await;
    let right = app.create_menu("Right", None, 1).await;
    let r_left = app.create_role("left").await;
    let r_right = app.create_role("right").await;
    app.registry
        .roles
        .set_role_permissions(r_left, &[left.id], &[])
        .await
        .expect("grant");
    app.registry
        .roles
        .set_role_permissions(r_right, &[right.id], &[])
        .await
        .expect("grant");

    let registry = Arc::new(app.registry.clone());
    let writer = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            for i in 0..50 {
                let roles = if i % 2 == 0 { [r_left] } else { [r_right] };
                registry
                    .assignments
                    .set_user_roles(user.id, &roles)
                    .await
                    .expect("assign");
            }
        })
    };

    for _ in 0..50 {
        let tree = registry
            .permissions
            .get_left_menus_for_user(user.id)
            .await
            .expect("menus");
        // Exactly one role at a time: never both menus.
        assert!(tree.len() <= 1);
    }
    writer.await.expect("writer");
}
