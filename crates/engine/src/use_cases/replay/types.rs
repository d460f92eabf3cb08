//! Inputs, events and errors shared by the replay use cases.

use playcast_domain::{CommentaryMode, DomainError, GameId, ReplayInterval, UserId};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::infrastructure::ports::RepoError;

/// Inline text sent in place of commentary when the model fails.
pub const GENERATION_FAILED_TEXT: &str = "Error generating commentary. Please try again later.";

/// Final event of a replay that ran to the end.
pub const REPLAY_COMPLETE_TEXT: &str = "Replay complete.";

/// Raw Start/Pause body. Every field is optional here so that a missing one
/// is reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<String>,
    #[serde(alias = "gid")]
    pub game_id: Option<String>,
    pub mode: Option<String>,
    #[serde(alias = "interval")]
    pub interval_seconds: Option<f64>,
}

/// Raw Resume body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRequest {
    #[serde(alias = "user_id")]
    pub user_id: Option<String>,
}

/// A Start/Pause request with every field present and valid.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySettings {
    pub user_id: UserId,
    pub game_id: GameId,
    pub mode: CommentaryMode,
    pub interval: ReplayInterval,
}

impl ReplayRequest {
    pub fn validate(self) -> Result<ReplaySettings, ReplayError> {
        let user_id = parse_user_id(self.user_id)?;
        let game_id = GameId::new(required(self.game_id, "gameId")?)?;
        let mode = required(self.mode, "mode")?.parse::<CommentaryMode>()?;
        let interval = ReplayInterval::from_secs(required(self.interval_seconds, "intervalSeconds")?)?;

        Ok(ReplaySettings {
            user_id,
            game_id,
            mode,
            interval,
        })
    }
}

impl ResumeRequest {
    pub fn validate(self) -> Result<UserId, ReplayError> {
        parse_user_id(self.user_id)
    }
}

fn parse_user_id(raw: Option<String>) -> Result<UserId, ReplayError> {
    Ok(UserId::new(required(raw, "userId")?)?)
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ReplayError> {
    value.ok_or(ReplayError::MissingField(field))
}

/// One item of a replay stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayEvent {
    /// Commentary for the play at `index`.
    Commentary { index: usize, text: String },
    /// The play at `index` produced an inline error message instead.
    PlayFailed { index: usize, message: String },
    /// Every play has been delivered.
    Completed,
    /// The replay stopped on an infrastructure failure.
    Aborted { message: String },
}

impl ReplayEvent {
    /// Text payload sent to the client.
    pub fn text(&self) -> String {
        match self {
            ReplayEvent::Commentary { text, .. } => text.clone(),
            ReplayEvent::PlayFailed { message, .. } => message.clone(),
            ReplayEvent::Completed => REPLAY_COMPLETE_TEXT.to_string(),
            ReplayEvent::Aborted { message } => format!("Error: {message}"),
        }
    }

    /// Play index the event belongs to, if any.
    pub fn play_index(&self) -> Option<usize> {
        match self {
            ReplayEvent::Commentary { index, .. } | ReplayEvent::PlayFailed { index, .. } => {
                Some(*index)
            }
            ReplayEvent::Completed | ReplayEvent::Aborted { .. } => None,
        }
    }
}

/// Receiving end of a running replay. Dropping it stops the replay after the
/// event in flight.
pub type ReplayStream = mpsc::Receiver<ReplayEvent>;

/// What a Resume request did.
#[derive(Debug)]
pub enum ResumeOutcome {
    /// The session was not paused; nothing changed.
    AlreadyRunning,
    /// The session was paused and now streams from its cursor.
    Resumed(ReplayStream),
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("No replay to resume for this user")]
    NoActiveReplay,
    #[error("Session store error: {0}")]
    Repo(#[from] RepoError),
}

impl ReplayError {
    /// Errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        match self {
            ReplayError::MissingField(_) | ReplayError::NoActiveReplay => true,
            ReplayError::Invalid(e) => e.is_validation(),
            ReplayError::Repo(_) => false,
        }
    }
}
