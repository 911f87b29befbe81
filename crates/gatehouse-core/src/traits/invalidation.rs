//! Explicit invalidation signal for resolved-permission caches.

use async_trait::async_trait;

use crate::events::AccessEvent;
use crate::result::AppResult;

/// Receives access-change events after the corresponding write committed.
///
/// Writers (role assignment, role permissions, user deletion, menu
/// changes) call [`PermissionInvalidator::invalidate`] once per committed
/// change. Implementations must make every cached resolution computed
/// before the call unreachable afterwards.
#[async_trait]
pub trait PermissionInvalidator: Send + Sync + std::fmt::Debug + 'static {
    /// Invalidate whatever the event makes stale.
    async fn invalidate(&self, event: &AccessEvent) -> AppResult<()>;
}

/// Invalidator used when no permission cache is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInvalidator;

#[async_trait]
impl PermissionInvalidator for NoopInvalidator {
    async fn invalidate(&self, _event: &AccessEvent) -> AppResult<()> {
        Ok(())
    }
}
