//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod commentary;
pub mod games;
pub mod replay;

// Re-export main types
pub use commentary::PlayCommentator;
pub use games::GameUseCases;
pub use replay::ReplayUseCases;
