//! Shared test helpers for integration tests.

use std::sync::Arc;

use gatehouse_cache::CacheManager;
use gatehouse_core::config::{AppConfig, DatabaseConfig, StorageBackend};
use gatehouse_core::types::{MenuId, RoleId};
use gatehouse_entity::menu::{Button, Menu, NewButton, NewMenu};
use gatehouse_entity::role::NewRole;
use gatehouse_entity::user::{NewUser, User};
use gatehouse_database::DatabasePool;
use gatehouse_database::migration::run_migrations;
use gatehouse_service::{Repositories, ServiceRegistry};

/// A password that satisfies the default policy.
pub const PASSWORD: &str = "N8#kdP2!qXv7@Lm";

/// A second policy-compliant password.
pub const OTHER_PASSWORD: &str = "Zr7!mQ2#vLp9@Xk";

/// Test application context
pub struct TestApp {
    /// Every service, over the memory store and memory cache
    pub registry: ServiceRegistry,
}

/// Environment variable naming the PostgreSQL database used by the
/// PostgreSQL-backed tests. Those tests are skipped when it is unset.
pub const TEST_DATABASE_URL: &str = "GATEHOUSE_TEST_DATABASE_URL";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = StorageBackend::Memory;
    config.auth.jwt_secret = "integration-test-secret".into();
    config.auth.password_hash_memory_kib = 1024;
    config.auth.password_hash_iterations = 1;
    config
}

impl TestApp {
    /// Create a new test application with cheap password hashing
    pub fn new() -> Self {
        let registry =
            ServiceRegistry::in_memory(&test_config()).expect("Failed to build registry");
        Self { registry }
    }

    /// Create a user with [`PASSWORD`]
    pub async fn create_user(&self, username: &str) -> User {
        self.registry
            .users
            .create(NewUser::new(username, PASSWORD))
            .await
            .expect("Failed to create user")
    }

    /// Log in with [`PASSWORD`] and return the token
    pub async fn login(&self, username: &str) -> String {
        self.registry
            .sessions
            .login(username, PASSWORD)
            .await
            .expect("Failed to log in")
            .token
    }

    /// Create a role
    pub async fn create_role(&self, name: &str) -> RoleId {
        self.registry
            .roles
            .create_role(NewRole {
                name: name.into(),
                description: None,
            })
            .await
            .expect("Failed to create role")
            .id
    }

    /// Create a menu, optionally under a parent
    pub async fn create_menu(&self, name: &str, parent: Option<MenuId>, sort_order: i32) -> Menu {
        let mut new = NewMenu::new(name, format!("/{}", name.to_lowercase())).with_sort_order(sort_order);
        new.parent_id = parent;
        self.registry
            .menus
            .create_menu(new)
            .await
            .expect("Failed to create menu")
    }

    /// Create a button on a menu
    pub async fn create_button(&self, menu_id: MenuId, code: &str) -> Button {
        self.registry
            .menus
            .create_button(NewButton::new(menu_id, code, code))
            .await
            .expect("Failed to create button")
    }
}

/// PostgreSQL-backed repositories and services over one migrated pool.
pub struct PgTestApp {
    /// Repository handles, for asserting on stored state directly
    pub repos: Repositories,
    /// Every service over the same repositories and a memory cache
    pub registry: ServiceRegistry,
}

impl PgTestApp {
    /// Connect to [`TEST_DATABASE_URL`] and apply migrations.
    ///
    /// Returns `None` when the variable is unset. Tests share one database
    /// and run in parallel, so they never truncate and always use
    /// [`unique`] names.
    pub async fn connect() -> Option<Self> {
        let Ok(url) = std::env::var(TEST_DATABASE_URL) else {
            eprintln!("{TEST_DATABASE_URL} not set; skipping PostgreSQL test");
            return None;
        };

        let mut config = test_config();
        config.database = DatabaseConfig {
            backend: StorageBackend::Postgres,
            url,
            max_connections: 4,
            min_connections: 0,
            ..DatabaseConfig::default()
        };

        let pool = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        run_migrations(pool.pool())
            .await
            .expect("Failed to run migrations");

        let repos = Repositories::postgres(&pool);
        let registry = ServiceRegistry::build(
            &config,
            repos.clone(),
            Arc::new(CacheManager::in_memory()),
        )
        .expect("Failed to build registry");
        Some(Self { repos, registry })
    }
}

/// A name no other test run has used, valid as a username.
pub fn unique(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &suffix[..12])
}
