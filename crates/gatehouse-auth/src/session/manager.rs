//! Session lifecycle manager: login, logout, and token resolution.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use gatehouse_core::config::SessionConfig;
use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::types::UserId;
use gatehouse_database::repositories::{SessionRepository, UserRepository};
use gatehouse_entity::session::{NewSession, Session, TerminationReason};
use gatehouse_entity::user::User;

use crate::jwt::{JwtDecoder, JwtEncoder};
use crate::password::PasswordHasher;

/// Shared message for every credential failure so callers cannot tell an
/// unknown username from a wrong password.
const INVALID_LOGIN: &str = "Invalid username or password";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Bearer token to present on later calls.
    pub token: String,
    /// The session the token is bound to.
    pub session: Session,
    /// The authenticated user.
    pub user: User,
}

/// Issues, resolves, and revokes bearer tokens.
#[derive(Clone)]
pub struct SessionManager {
    jwt_encoder: Arc<JwtEncoder>,
    jwt_decoder: Arc<JwtDecoder>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    password_hasher: Arc<PasswordHasher>,
    session_config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_config", &self.session_config)
            .finish_non_exhaustive()
    }
}

/// Hex-encoded SHA-256 of a token.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        password_hasher: Arc<PasswordHasher>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            jwt_encoder,
            jwt_decoder,
            users,
            sessions,
            password_hasher,
            session_config,
        }
    }

    /// Verify credentials and issue a token bound to a new session.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// `InvalidCredential`. An inactive account fails with `Forbidden`, but
    /// only once its password verified.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            self.password_hasher.verify_dummy(password);
            warn!(username = %username, "Login rejected: unknown user");
            return Err(AppError::invalid_credential(INVALID_LOGIN));
        };

        let Some(credential) = self.users.find_credential(user.id).await? else {
            self.password_hasher.verify_dummy(password);
            warn!(user_id = %user.id, "Login rejected: no credential");
            return Err(AppError::invalid_credential(INVALID_LOGIN));
        };

        if !self
            .password_hasher
            .verify_password(password, &credential.password_hash)?
        {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::invalid_credential(INVALID_LOGIN));
        }

        if !user.can_login() {
            warn!(user_id = %user.id, status = %user.status, "Login rejected: account inactive");
            return Err(AppError::forbidden("Account is inactive"));
        }

        let session_id = Uuid::now_v7();
        let issued = self.jwt_encoder.issue(user.id, session_id)?;
        let session = self
            .sessions
            .create(&NewSession {
                id: session_id,
                user_id: user.id,
                token_hash: hash_token(&issued.token),
                expires_at: issued.expires_at,
            })
            .await
            .map_err(|e| {
                if e.is(ErrorKind::NotFound) {
                    AppError::invalid_credential(INVALID_LOGIN)
                } else {
                    e
                }
            })?;

        info!(user_id = %user.id, session_id = %session.id, "Login successful");
        Ok(LoginResult {
            token: issued.token,
            session,
            user,
        })
    }

    /// End the session behind `token`.
    ///
    /// Unknown, expired, malformed, or already revoked tokens succeed
    /// without doing anything.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        let claims = match self.jwt_decoder.decode(token.trim()) {
            Ok(claims) => claims,
            Err(e) if e.is(ErrorKind::Unauthenticated) => return Ok(()),
            Err(e) => return Err(e),
        };
        let session_id = claims.session_id();

        let terminated = self
            .sessions
            .terminate(session_id, TerminationReason::Logout)
            .await?;
        self.jwt_decoder
            .revoke_session(session_id, self.revocation_ttl(claims.remaining_ttl_seconds()))
            .await?;

        if terminated {
            info!(session_id = %session_id, "Logout completed");
        }
        Ok(())
    }

    /// Resolve a token to the user it is bound to.
    ///
    /// `Unauthenticated` when the token is empty, malformed, expired,
    /// revoked, or its session no longer exists.
    pub async fn resolve(&self, token: &str) -> Result<UserId, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::unauthenticated("Missing token"));
        }

        let claims = self.jwt_decoder.decode(token)?;
        let user_id = claims.user_id()?;
        let session_id = claims.session_id();

        // The session row below is authoritative; a cache failure only
        // costs the fast path.
        match self.jwt_decoder.is_session_revoked(session_id).await {
            Ok(true) => return Err(AppError::unauthenticated("Session has been revoked")),
            Ok(false) => {}
            Err(e) => warn!(session_id = %session_id, error = %e, "Revocation check failed"),
        }

        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("Session no longer exists"))?;

        if session.user_id != user_id || session.token_hash != hash_token(token) {
            return Err(AppError::unauthenticated("Token does not match its session"));
        }
        if !session.is_active() {
            return Err(AppError::unauthenticated("Session has ended"));
        }

        Ok(user_id)
    }

    /// Resolve an `Authorization` header value of the form `Bearer <token>`.
    pub async fn resolve_bearer(&self, header: &str) -> Result<UserId, AppError> {
        let header = header.trim();
        let token = match header.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token,
            _ => return Err(AppError::unauthenticated("Expected a Bearer token")),
        };
        self.resolve(token).await
    }

    /// Terminate and revoke every active session of the user.
    ///
    /// Returns how many sessions were ended.
    pub async fn revoke_all_for_user(
        &self,
        user_id: UserId,
        reason: TerminationReason,
    ) -> Result<usize, AppError> {
        let ended = self.sessions.terminate_all_for_user(user_id, reason).await?;
        self.blocklist(&ended).await?;
        if !ended.is_empty() {
            info!(user_id = %user_id, count = ended.len(), reason = %reason, "Sessions revoked");
        }
        Ok(ended.len())
    }

    /// Sessions of the user that can still resolve.
    pub async fn active_sessions(&self, user_id: UserId) -> Result<Vec<Session>, AppError> {
        self.sessions.find_active_by_user(user_id).await
    }

    /// Mark sessions as revoked in the cache so their tokens fail fast,
    /// even after the session rows are gone.
    pub async fn blocklist(&self, sessions: &[Session]) -> Result<(), AppError> {
        for session in sessions {
            self.jwt_decoder
                .revoke_session(session.id, self.revocation_ttl(session.remaining_seconds()))
                .await?;
        }
        Ok(())
    }

    fn revocation_ttl(&self, remaining_seconds: u64) -> Duration {
        Duration::from_secs(remaining_seconds.max(self.session_config.blocklist_min_ttl_seconds))
    }
}
