//! Playcast domain types.
//!
//! Replay sessions, play records and the small value objects they are built
//! from. Nothing in here performs I/O.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    GameSummary, PlayFieldError, PlayRecord, PlayValue, ReplaySession, ReplayState,
};
pub use error::DomainError;
pub use ids::{GameId, PlayerId, ReplayRunId, UserId};
pub use value_objects::{CommentaryMode, ReplayInterval};
