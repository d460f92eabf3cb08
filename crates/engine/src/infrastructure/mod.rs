//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod cache;
pub mod chat_completions;
pub mod clock;
pub mod config;
pub mod memory_sessions;
pub mod pause_signals;
pub mod player_directory;
pub mod ports;
pub mod resilient_llm;
pub mod sqlite_sessions;
pub mod warehouse;
