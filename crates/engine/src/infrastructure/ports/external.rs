//! External service port traits (LLM, warehouse, commentary).

use async_trait::async_trait;
use playcast_domain::{CommentaryMode, GameId, GameSummary, PlayRecord, PlayerId};
use serde::{Deserialize, Serialize};

use super::error::{CommentaryError, LlmError, PlaySourceError};

// =============================================================================
// LLM Types
// =============================================================================

/// LLM request/response types
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The conversation history
    pub messages: Vec<ChatMessage>,
    /// System prompt / context
    pub system_prompt: Option<String>,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Nucleus sampling cutoff
    pub top_p: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            system_prompt: None,
            temperature: None,
            top_p: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A message in the conversation
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Response from the LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// The generated text content
    pub content: String,
    /// Finish reason
    pub finish_reason: FinishReason,
    /// Token usage
    pub usage: Option<TokenUsage>,
}

/// Reason the generation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    #[serde(other)]
    Unknown,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

// =============================================================================
// Play Data
// =============================================================================

/// Source of play-by-play rows and game listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaySourcePort: Send + Sync {
    /// All plays of a game in replay order. Repeated calls for the same game
    /// must return the same order.
    async fn fetch_plays(&self, game_id: &GameId) -> Result<Vec<PlayRecord>, PlaySourceError>;

    /// Most recent games on or before today, newest first.
    async fn recent_games(&self, limit: usize) -> Result<Vec<GameSummary>, PlaySourceError>;
}

/// Player id to display name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerDirectoryPort: Send + Sync {
    /// `Ok(None)` when the id is unknown to the directory.
    async fn lookup(&self, player_id: &PlayerId) -> Result<Option<String>, PlaySourceError>;
}

// =============================================================================
// Commentary
// =============================================================================

/// Turns one play into one piece of commentary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentaryPort: Send + Sync {
    async fn generate(
        &self,
        play: &PlayRecord,
        mode: CommentaryMode,
    ) -> Result<String, CommentaryError>;
}
