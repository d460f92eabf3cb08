//! Domain entities.

mod game;
mod play;
mod replay_session;

pub use game::GameSummary;
pub use play::{PlayFieldError, PlayRecord, PlayValue};
pub use replay_session::{ReplaySession, ReplayState};
