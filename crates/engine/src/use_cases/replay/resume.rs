//! Resume replay use case.

use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, PlaySourcePort, ReplaySessionRepo};

use super::runner::ReplayRunner;
use super::types::{ReplayError, ResumeOutcome, ResumeRequest};

/// Clear a user's pause flag and stream the rest of their game.
pub struct ResumeReplay {
    sessions: Arc<dyn ReplaySessionRepo>,
    plays: Arc<dyn PlaySourcePort>,
    runner: Arc<ReplayRunner>,
    clock: Arc<dyn ClockPort>,
}

impl ResumeReplay {
    pub fn new(
        sessions: Arc<dyn ReplaySessionRepo>,
        plays: Arc<dyn PlaySourcePort>,
        runner: Arc<ReplayRunner>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            sessions,
            plays,
            runner,
            clock,
        }
    }

    /// A session that is not paused (or was never written) is reported as
    /// already running and left untouched.
    pub async fn execute(&self, request: ResumeRequest) -> Result<ResumeOutcome, ReplayError> {
        let user_id = request.validate()?;

        let Some(mut session) = self.sessions.get(&user_id).await? else {
            return Ok(ResumeOutcome::AlreadyRunning);
        };
        if !session.is_paused {
            return Ok(ResumeOutcome::AlreadyRunning);
        }
        let Some(game_id) = session.game_id.clone() else {
            return Err(ReplayError::NoActiveReplay);
        };

        session.resume(self.clock.now());
        self.sessions.save(&session).await?;

        tracing::info!(
            user_id = %user_id,
            game_id = %game_id,
            cursor = session.current_play_index,
            "Replay resumed"
        );

        let stream = match self.plays.fetch_plays(&game_id).await {
            Ok(plays) => self
                .runner
                .spawn(user_id, plays, session.current_play_index),
            Err(e) => {
                tracing::error!(game_id = %game_id, error = %e, "Failed to load plays");
                ReplayRunner::aborted(e.to_string())
            }
        };
        Ok(ResumeOutcome::Resumed(stream))
    }
}
