//! In-memory replay session storage.

use async_trait::async_trait;
use dashmap::DashMap;
use playcast_domain::{ReplaySession, UserId};

use crate::infrastructure::ports::{RepoError, ReplaySessionRepo};

/// Process-local session store. Records are lost on restart.
#[derive(Default)]
pub struct InMemoryReplaySessionRepo {
    sessions: DashMap<UserId, ReplaySession>,
}

impl InMemoryReplaySessionRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReplaySessionRepo for InMemoryReplaySessionRepo {
    async fn get(&self, user_id: &UserId) -> Result<Option<ReplaySession>, RepoError> {
        Ok(self.sessions.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, session: &ReplaySession) -> Result<(), RepoError> {
        self.sessions
            .insert(session.user_id.clone(), session.clone());
        Ok(())
    }
}
