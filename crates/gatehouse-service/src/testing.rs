//! Shared fixtures for unit tests.

use gatehouse_core::config::AppConfig;

use crate::ServiceRegistry;

/// A password that satisfies the default policy.
pub const PASSWORD: &str = "N8#kdP2!qXv7@Lm";

/// Registry over the memory store with cheap hashing.
pub fn registry() -> ServiceRegistry {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "unit-test-secret".into();
    config.auth.password_hash_memory_kib = 1024;
    config.auth.password_hash_iterations = 1;
    ServiceRegistry::in_memory(&config).expect("registry")
}
