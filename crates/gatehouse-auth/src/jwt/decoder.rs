//! JWT token validation and session revocation markers.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use uuid::Uuid;

use gatehouse_cache::keys;
use gatehouse_cache::provider::CacheManager;
use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::traits::CacheProvider;

use super::claims::Claims;

/// Validates tokens and tracks revoked sessions in the cache.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
    cache: Arc<CacheManager>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            cache,
        }
    }

    /// Verify signature, issuer and expiry. Every failure is `Unauthenticated`.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::unauthenticated("Token has expired"),
                JwtErrorKind::InvalidSignature => {
                    AppError::unauthenticated("Invalid token signature")
                }
                JwtErrorKind::InvalidIssuer => AppError::unauthenticated("Invalid token issuer"),
                _ => AppError::unauthenticated("Malformed token"),
            })
    }

    /// Whether the session carries a revocation marker.
    pub async fn is_session_revoked(&self, session_id: Uuid) -> Result<bool, AppError> {
        self.cache.exists(&keys::session_revoked(session_id)).await
    }

    /// Mark a session revoked for `ttl`.
    pub async fn revoke_session(&self, session_id: Uuid, ttl: Duration) -> Result<(), AppError> {
        self.cache
            .set(&keys::session_revoked(session_id), "revoked", ttl)
            .await
    }
}
