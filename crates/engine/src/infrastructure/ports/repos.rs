//! Repository port for replay session storage.

use async_trait::async_trait;
use playcast_domain::{ReplaySession, UserId};

use super::error::RepoError;

// =============================================================================
// Replay Session Storage
// =============================================================================

/// Per-user replay session records.
///
/// There is no partial update and no compare-and-set: `save` replaces the
/// whole record and the last writer wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplaySessionRepo: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Result<Option<ReplaySession>, RepoError>;
    async fn save(&self, session: &ReplaySession) -> Result<(), RepoError>;
}
