//! Display style for generated commentary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// How a play should be described to the listener.
///
/// Only prompt phrasing depends on the mode; the replay loop treats every
/// mode identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentaryMode {
    /// Analyst voice: pitch sequence, matchup and fielding detail
    Technical,
    /// Broadcast voice for casual fans
    #[default]
    Casual,
}

impl CommentaryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentaryMode::Technical => "technical",
            CommentaryMode::Casual => "casual",
        }
    }
}

impl fmt::Display for CommentaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentaryMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technical" => Ok(CommentaryMode::Technical),
            "casual" => Ok(CommentaryMode::Casual),
            other => Err(DomainError::parse(format!(
                "Unknown commentary mode '{other}' (expected 'technical' or 'casual')"
            ))),
        }
    }
}
