//! Value objects for replay configuration.

mod commentary_mode;
mod interval;

pub use commentary_mode::CommentaryMode;
pub use interval::ReplayInterval;
