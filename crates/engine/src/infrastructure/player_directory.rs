//! Cached player-name lookups.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use playcast_domain::PlayerId;

use crate::infrastructure::cache::BoundedTtlCache;
use crate::infrastructure::ports::{PlaySourceError, PlayerDirectoryPort};

/// Name used in prompts when a player cannot be resolved.
pub const UNKNOWN_PLAYER: &str = "Unknown Player";

/// Wraps a directory with a bounded cache.
///
/// Every play names a batter and a pitcher, and the same handful of players
/// appear over and over in one game. Misses (`Ok(None)`) are cached too;
/// errors are not.
pub struct CachedPlayerDirectory {
    inner: Arc<dyn PlayerDirectoryPort>,
    cache: BoundedTtlCache<PlayerId, Option<String>>,
}

impl CachedPlayerDirectory {
    pub fn new(inner: Arc<dyn PlayerDirectoryPort>, capacity: usize, ttl: Duration) -> Self {
        Self {
            inner,
            cache: BoundedTtlCache::new(capacity, ttl),
        }
    }
}

#[async_trait]
impl PlayerDirectoryPort for CachedPlayerDirectory {
    async fn lookup(&self, player_id: &PlayerId) -> Result<Option<String>, PlaySourceError> {
        if let Some(cached) = self.cache.get(player_id).await {
            return Ok(cached);
        }

        let resolved = self.inner.lookup(player_id).await?;
        self.cache.insert(player_id.clone(), resolved.clone()).await;
        Ok(resolved)
    }
}

/// Resolve a display name, falling back to [`UNKNOWN_PLAYER`] on any failure.
pub async fn display_name(directory: &dyn PlayerDirectoryPort, player_id: Option<PlayerId>) -> String {
    let Some(player_id) = player_id else {
        return UNKNOWN_PLAYER.to_string();
    };

    match directory.lookup(&player_id).await {
        Ok(Some(name)) => name,
        Ok(None) => UNKNOWN_PLAYER.to_string(),
        Err(e) => {
            tracing::warn!(player_id = %player_id, error = %e, "Player lookup failed");
            UNKNOWN_PLAYER.to_string()
        }
    }
}
