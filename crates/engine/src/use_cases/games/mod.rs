//! Game listing use cases.

use std::sync::Arc;

use playcast_domain::GameSummary;

use crate::infrastructure::ports::{PlaySourceError, PlaySourcePort};

/// Size of the game picker list.
pub const RECENT_GAMES_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum RecentGamesError {
    #[error("Failed to list recent games: {0}")]
    PlaySource(#[from] PlaySourceError),
}

/// List the most recent games played on or before today.
pub struct RecentGames {
    plays: Arc<dyn PlaySourcePort>,
}

impl RecentGames {
    pub fn new(plays: Arc<dyn PlaySourcePort>) -> Self {
        Self { plays }
    }

    pub async fn execute(&self) -> Result<Vec<GameSummary>, RecentGamesError> {
        let games = self.plays.recent_games(RECENT_GAMES_LIMIT).await?;
        tracing::debug!(count = games.len(), "Listed recent games");
        Ok(games)
    }
}

/// Container for game listing use cases.
pub struct GameUseCases {
    pub recent: Arc<RecentGames>,
}

impl GameUseCases {
    pub fn new(recent: Arc<RecentGames>) -> Self {
        Self { recent }
    }
}
