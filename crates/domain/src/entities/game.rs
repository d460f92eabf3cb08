use serde::{Deserialize, Serialize};

use crate::ids::GameId;

/// A recently played game, as listed for the client's game picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub gid: GameId,
    /// Team on the mound for the first recorded play
    pub pitteam: String,
    /// Team at bat for the first recorded play
    pub batteam: String,
}
