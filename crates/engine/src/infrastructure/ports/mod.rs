//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Session persistence (SQLite or in-memory)
//! - LLM calls (any OpenAI-compatible endpoint)
//! - Play data (warehouse) and player names
//! - Commentary generation, so the replay loop can be driven without a model
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::ReplaySessionRepo;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, CommentaryPort, FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole,
    PlaySourcePort, PlayerDirectoryPort, TokenUsage,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::MockReplaySessionRepo;

#[cfg(test)]
pub use external::{MockCommentaryPort, MockPlaySourcePort, MockPlayerDirectoryPort};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{CommentaryError, LlmError, PlaySourceError, RepoError};
