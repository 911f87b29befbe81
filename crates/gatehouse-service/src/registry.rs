//! Wires every service from configuration.

use std::sync::Arc;

use tracing::info;

use gatehouse_auth::jwt::{JwtDecoder, JwtEncoder};
use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_auth::session::{SessionCleanup, SessionManager};
use gatehouse_cache::CacheManager;
use gatehouse_core::config::{AppConfig, StorageBackend};
use gatehouse_core::error::AppError;
use gatehouse_core::traits::{NoopInvalidator, PermissionInvalidator};
use gatehouse_database::repositories::postgres::{
    PgAssignmentRepository, PgMenuRepository, PgRoleRepository, PgSessionRepository,
    PgUserRepository,
};
use gatehouse_database::repositories::{
    AssignmentRepository, MenuRepository, RoleRepository, SessionRepository, UserRepository,
};
use gatehouse_database::{DatabasePool, MemoryStore};

use crate::assignment::AssignmentService;
use crate::menu::MenuService;
use crate::permission::{PermissionCache, PermissionResolver};
use crate::role::RoleService;
use crate::user::UserDirectory;

/// One handle per repository, all backed by the same store.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Users and credentials.
    pub users: Arc<dyn UserRepository>,
    /// Roles and their grants.
    pub roles: Arc<dyn RoleRepository>,
    /// Menus and buttons.
    pub menus: Arc<dyn MenuRepository>,
    /// User to role assignments.
    pub assignments: Arc<dyn AssignmentRepository>,
    /// Sessions.
    pub sessions: Arc<dyn SessionRepository>,
}

impl Repositories {
    /// Repositories over a process-local store.
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            roles: Arc::new(store.clone()),
            menus: Arc::new(store.clone()),
            assignments: Arc::new(store.clone()),
            sessions: Arc::new(store),
        }
    }

    /// Repositories over a PostgreSQL pool.
    pub fn postgres(pool: &DatabasePool) -> Self {
        let pool = pool.pool().clone();
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            roles: Arc::new(PgRoleRepository::new(pool.clone())),
            menus: Arc::new(PgMenuRepository::new(pool.clone())),
            assignments: Arc::new(PgAssignmentRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool)),
        }
    }
}

/// Every Gatehouse service, constructed once and shared.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    /// User directory.
    pub users: Arc<UserDirectory>,
    /// Role management.
    pub roles: Arc<RoleService>,
    /// Menu and button management.
    pub menus: Arc<MenuService>,
    /// Role assignment.
    pub assignments: Arc<AssignmentService>,
    /// Permission resolution.
    pub permissions: Arc<PermissionResolver>,
    /// Login, logout, and token resolution.
    pub sessions: Arc<SessionManager>,
    /// Expired-session purge.
    pub session_cleanup: Arc<SessionCleanup>,
    /// Shared cache.
    pub cache: Arc<CacheManager>,
    /// PostgreSQL pool, when that backend is configured.
    pub database: Option<DatabasePool>,
}

impl ServiceRegistry {
    /// Connect to the configured store and cache and build every service.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let cache = Arc::new(CacheManager::new(&config.cache).await?);
        let (repositories, database) = match config.database.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage backend");
                (Repositories::memory(MemoryStore::new()), None)
            }
            StorageBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                (Repositories::postgres(&pool), Some(pool))
            }
        };
        let mut registry = Self::build(config, repositories, cache)?;
        registry.database = database;
        Ok(registry)
    }

    /// A registry over a fresh in-memory store and in-memory cache.
    pub fn in_memory(config: &AppConfig) -> Result<Self, AppError> {
        Self::build(
            config,
            Repositories::memory(MemoryStore::new()),
            Arc::new(CacheManager::in_memory()),
        )
    }

    /// Build every service over the given repositories and cache.
    pub fn build(
        config: &AppConfig,
        repositories: Repositories,
        cache: Arc<CacheManager>,
    ) -> Result<Self, AppError> {
        if config.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must be set"));
        }

        let hasher = Arc::new(PasswordHasher::new(&config.auth)?);
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let encoder = Arc::new(JwtEncoder::new(&config.auth)?);
        let decoder = Arc::new(JwtDecoder::new(&config.auth, Arc::clone(&cache)));

        let permission_cache = config
            .cache
            .permission_cache_enabled
            .then(|| Arc::new(PermissionCache::new(Arc::clone(&cache), &config.cache)));
        let invalidator: Arc<dyn PermissionInvalidator> = match &permission_cache {
            Some(pc) => Arc::clone(pc) as Arc<dyn PermissionInvalidator>,
            None => Arc::new(NoopInvalidator),
        };

        let sessions = Arc::new(SessionManager::new(
            encoder,
            decoder,
            Arc::clone(&repositories.users),
            Arc::clone(&repositories.sessions),
            Arc::clone(&hasher),
            config.session.clone(),
        ));
        let session_cleanup = Arc::new(SessionCleanup::new(
            Arc::clone(&repositories.sessions),
            &config.session,
        )?);

        Ok(Self {
            users: Arc::new(UserDirectory::new(
                Arc::clone(&repositories.users),
                Arc::clone(&sessions),
                hasher,
                validator,
                Arc::clone(&invalidator),
            )),
            roles: Arc::new(RoleService::new(
                Arc::clone(&repositories.roles),
                Arc::clone(&invalidator),
            )),
            menus: Arc::new(MenuService::new(
                Arc::clone(&repositories.menus),
                Arc::clone(&invalidator),
            )),
            assignments: Arc::new(AssignmentService::new(
                Arc::clone(&repositories.assignments),
                invalidator,
            )),
            permissions: Arc::new(PermissionResolver::new(
                repositories.assignments,
                permission_cache,
            )),
            sessions,
            session_cleanup,
            cache,
            database: None,
        })
    }
}
