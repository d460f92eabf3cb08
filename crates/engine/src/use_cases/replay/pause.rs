//! Pause replay use case.

use std::sync::Arc;

use playcast_domain::{ReplayInterval, ReplaySession};

use crate::infrastructure::pause_signals::PauseSignals;
use crate::infrastructure::ports::{ClockPort, ReplaySessionRepo};

use super::types::{ReplayError, ReplayRequest};

/// Flag a user's session as paused.
///
/// A replay loop notices the flag before its next play. Loops in this
/// process are also woken from their interval sleep.
pub struct PauseReplay {
    sessions: Arc<dyn ReplaySessionRepo>,
    signals: Arc<PauseSignals>,
    clock: Arc<dyn ClockPort>,
    default_interval: ReplayInterval,
}

impl PauseReplay {
    pub fn new(
        sessions: Arc<dyn ReplaySessionRepo>,
        signals: Arc<PauseSignals>,
        clock: Arc<dyn ClockPort>,
        default_interval: ReplayInterval,
    ) -> Self {
        Self {
            sessions,
            signals,
            clock,
            default_interval,
        }
    }

    /// Idempotent: pausing a paused session only refreshes its settings.
    pub async fn execute(&self, request: ReplayRequest) -> Result<ReplaySession, ReplayError> {
        let settings = request.validate()?;

        let mut session = self
            .sessions
            .get(&settings.user_id)
            .await?
            .unwrap_or_else(|| ReplaySession::new(settings.user_id.clone(), self.default_interval));
        session.pause(
            settings.game_id,
            settings.mode,
            settings.interval,
            self.clock.now(),
        );
        self.sessions.save(&session).await?;
        self.signals.signal(&settings.user_id);

        tracing::info!(
            user_id = %settings.user_id,
            cursor = session.current_play_index,
            "Replay paused"
        );
        Ok(session)
    }
}
