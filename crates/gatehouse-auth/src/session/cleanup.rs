//! On-demand purge of ended sessions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use gatehouse_core::config::SessionConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::repositories::SessionRepository;

/// Deletes session rows that ended longer ago than the retention window.
#[derive(Clone)]
pub struct SessionCleanup {
    sessions: Arc<dyn SessionRepository>,
    retention: Duration,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup")
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

impl SessionCleanup {
    /// Creates a new cleanup handler.
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        config: &SessionConfig,
    ) -> Result<Self, AppError> {
        let retention = i64::try_from(config.retention_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "session.retention_hours out of range: {}",
                    config.retention_hours
                ))
            })?;
        Ok(Self {
            sessions,
            retention,
        })
    }

    /// Remove expired and terminated sessions older than the retention
    /// window. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let cutoff = Utc::now()
            .checked_sub_signed(self.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let removed = self.sessions.delete_inactive_before(cutoff).await?;
        info!(removed, cutoff = %cutoff, "Session purge completed");
        Ok(removed)
    }
}
