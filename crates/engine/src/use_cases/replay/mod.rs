//! Replay use cases.
//!
//! A replay walks one game's plays for one user:
//! 1. Start configures the user's session and streams from its cursor
//! 2. Pause flags the session; the loop stops before its next play
//! 3. Resume clears the flag and streams from the checkpointed cursor

use std::sync::Arc;

mod pause;
mod resume;
mod runner;
mod start;
mod types;

#[cfg(test)]
mod flow_tests;

pub use pause::PauseReplay;
pub use resume::ResumeReplay;
pub use runner::ReplayRunner;
pub use start::StartReplay;
pub use types::{
    ReplayError, ReplayEvent, ReplayRequest, ReplaySettings, ReplayStream, ResumeOutcome,
    ResumeRequest, GENERATION_FAILED_TEXT, REPLAY_COMPLETE_TEXT,
};

/// Container for replay use cases.
pub struct ReplayUseCases {
    pub start: Arc<StartReplay>,
    pub pause: Arc<PauseReplay>,
    pub resume: Arc<ResumeReplay>,
}

impl ReplayUseCases {
    pub fn new(start: Arc<StartReplay>, pause: Arc<PauseReplay>, resume: Arc<ResumeReplay>) -> Self {
        Self {
            start,
            pause,
            resume,
        }
    }
}
