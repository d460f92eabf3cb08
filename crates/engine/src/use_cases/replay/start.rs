//! Start replay use case.

use std::sync::Arc;

use playcast_domain::{ReplayInterval, ReplaySession, ReplayState};

use crate::infrastructure::ports::{ClockPort, PlaySourcePort, ReplaySessionRepo};

use super::runner::ReplayRunner;
use super::types::{ReplayError, ReplayRequest, ReplayStream};

/// Configure a user's session for a game and stream commentary from the
/// session's cursor.
pub struct StartReplay {
    sessions: Arc<dyn ReplaySessionRepo>,
    plays: Arc<dyn PlaySourcePort>,
    runner: Arc<ReplayRunner>,
    clock: Arc<dyn ClockPort>,
    default_interval: ReplayInterval,
}

impl StartReplay {
    pub fn new(
        sessions: Arc<dyn ReplaySessionRepo>,
        plays: Arc<dyn PlaySourcePort>,
        runner: Arc<ReplayRunner>,
        clock: Arc<dyn ClockPort>,
        default_interval: ReplayInterval,
    ) -> Self {
        Self {
            sessions,
            plays,
            runner,
            clock,
            default_interval,
        }
    }

    /// The cursor and pause flag of an existing session are kept, even when
    /// the game changes.
    pub async fn execute(&self, request: ReplayRequest) -> Result<ReplayStream, ReplayError> {
        let settings = request.validate()?;

        let mut session = self
            .sessions
            .get(&settings.user_id)
            .await?
            .unwrap_or_else(|| ReplaySession::new(settings.user_id.clone(), self.default_interval));
        session.configure(
            settings.game_id.clone(),
            settings.mode,
            settings.interval,
            self.clock.now(),
        );
        self.sessions.save(&session).await?;

        tracing::info!(
            user_id = %settings.user_id,
            game_id = %settings.game_id,
            mode = %settings.mode,
            interval_seconds = %settings.interval,
            cursor = session.current_play_index,
            "Replay requested"
        );

        match self.plays.fetch_plays(&settings.game_id).await {
            Ok(plays) => {
                if !session.cursor_within(plays.len()) {
                    tracing::warn!(
                        cursor = session.current_play_index,
                        plays = plays.len(),
                        "Cursor is past the end of this game"
                    );
                }
                if let state @ (ReplayState::Paused | ReplayState::Completed) =
                    session.state(plays.len())
                {
                    tracing::info!(
                        ?state,
                        "Session is not running; the stream will end without commentary"
                    );
                }
                Ok(self
                    .runner
                    .spawn(settings.user_id, plays, session.current_play_index))
            }
            Err(e) => {
                tracing::error!(game_id = %settings.game_id, error = %e, "Failed to load plays");
                Ok(ReplayRunner::aborted(e.to_string()))
            }
        }
    }
}
