//! Application state and composition.

use std::sync::Arc;

use playcast_domain::ReplayInterval;

use crate::infrastructure::pause_signals::PauseSignals;
use crate::infrastructure::ports::{
    ClockPort, CommentaryPort, PlaySourcePort, ReplaySessionRepo,
};
use crate::use_cases::games::{GameUseCases, RecentGames};
use crate::use_cases::replay::{
    PauseReplay, ReplayRunner, ReplayUseCases, ResumeReplay, StartReplay,
};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub replay: ReplayUseCases,
    pub games: GameUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        sessions: Arc<dyn ReplaySessionRepo>,
        plays: Arc<dyn PlaySourcePort>,
        commentary: Arc<dyn CommentaryPort>,
        clock: Arc<dyn ClockPort>,
        default_interval: ReplayInterval,
    ) -> Self {
        // Shared between Pause and every running replay loop
        let signals = Arc::new(PauseSignals::new());

        let runner = Arc::new(ReplayRunner::new(
            sessions.clone(),
            commentary,
            signals.clone(),
            clock.clone(),
        ));

        let replay = ReplayUseCases::new(
            Arc::new(StartReplay::new(
                sessions.clone(),
                plays.clone(),
                runner.clone(),
                clock.clone(),
                default_interval,
            )),
            Arc::new(PauseReplay::new(
                sessions.clone(),
                signals,
                clock.clone(),
                default_interval,
            )),
            Arc::new(ResumeReplay::new(sessions, plays.clone(), runner, clock)),
        );

        let games = GameUseCases::new(Arc::new(RecentGames::new(plays)));

        Self {
            use_cases: UseCases { replay, games },
        }
    }
}
