//! Error types for port operations.

use playcast_domain::PlayFieldError;

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures of the warehouse behind plays, games and player names.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlaySourceError {
    #[error("Warehouse request failed: {0}")]
    RequestFailed(String),
    #[error("Warehouse returned an unreadable response: {0}")]
    InvalidResponse(String),
    #[error("Warehouse query did not finish in time")]
    Timeout,
}

/// Why commentary for one play could not be produced.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommentaryError {
    /// The play row is missing a field the prompt needs, or has it in the wrong shape.
    #[error("malformed play: {0}")]
    MalformedPlay(#[from] PlayFieldError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl CommentaryError {
    /// Malformed rows are data problems; everything else is a generation failure.
    pub fn is_malformed_play(&self) -> bool {
        matches!(self, Self::MalformedPlay(_))
    }
}
