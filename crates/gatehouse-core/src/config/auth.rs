//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing and password policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Issuer claim written into and required from every token.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Fixed token lifetime in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn strength score (0..=4).
    #[serde(default = "default_password_score")]
    pub password_min_score: u8,
    /// Argon2id memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub password_hash_memory_kib: u32,
    /// Argon2id iteration count.
    #[serde(default = "default_hash_iterations")]
    pub password_hash_iterations: u32,
    /// Argon2id lane count.
    #[serde(default = "default_hash_parallelism")]
    pub password_hash_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_issuer(),
            token_ttl_minutes: default_token_ttl(),
            password_min_length: default_password_min(),
            password_min_score: default_password_score(),
            password_hash_memory_kib: default_hash_memory(),
            password_hash_iterations: default_hash_iterations(),
            password_hash_parallelism: default_hash_parallelism(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_issuer() -> String {
    "gatehouse".to_string()
}

fn default_token_ttl() -> u64 {
    120
}

fn default_password_min() -> usize {
    8
}

fn default_password_score() -> u8 {
    3
}

fn default_hash_memory() -> u32 {
    19_456
}

fn default_hash_iterations() -> u32 {
    2
}

fn default_hash_parallelism() -> u32 {
    1
}
