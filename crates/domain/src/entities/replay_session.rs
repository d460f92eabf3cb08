//! Per-user replay progress.
//!
//! A `ReplaySession` is the whole persisted record for one user: which game is
//! being replayed, how it is narrated, how fast, and where the cursor is. The
//! session store overwrites it wholesale on every write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GameId, UserId};
use crate::value_objects::{CommentaryMode, ReplayInterval};

/// Where a replay stands, derived from the stored flag and cursor.
///
/// `Paused` and `Completed` are stored identically (`is_paused = true`); only
/// the length of the play sequence tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySession {
    pub user_id: UserId,
    pub game_id: Option<GameId>,
    pub mode: CommentaryMode,
    pub interval_seconds: ReplayInterval,
    /// Index of the next play to process.
    pub current_play_index: usize,
    pub is_paused: bool,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl ReplaySession {
    /// The record a user has before anything was ever written for them.
    pub fn new(user_id: UserId, default_interval: ReplayInterval) -> Self {
        Self {
            user_id,
            game_id: None,
            mode: CommentaryMode::default(),
            interval_seconds: default_interval,
            current_play_index: 0,
            is_paused: false,
            last_active_at: None,
        }
    }

    /// Overwrite game, mode and pacing for a new replay request.
    ///
    /// The cursor and pause flag are left alone: starting a replay for a user
    /// with progress continues from that user's cursor, even when the game
    /// changes.
    pub fn configure(
        &mut self,
        game_id: GameId,
        mode: CommentaryMode,
        interval: ReplayInterval,
        now: DateTime<Utc>,
    ) {
        self.game_id = Some(game_id);
        self.mode = mode;
        self.interval_seconds = interval;
        self.last_active_at = Some(now);
    }

    /// Flag the session as paused, taking the caller's latest settings.
    pub fn pause(
        &mut self,
        game_id: GameId,
        mode: CommentaryMode,
        interval: ReplayInterval,
        now: DateTime<Utc>,
    ) {
        self.configure(game_id, mode, interval, now);
        self.is_paused = true;
    }

    /// Clear the pause flag. Returns `false` when the session was not paused,
    /// in which case nothing changes.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_paused {
            return false;
        }
        self.is_paused = false;
        self.last_active_at = Some(now);
        true
    }

    /// Record that the play before `next_index` has been delivered.
    pub fn advance_to(&mut self, next_index: usize, now: DateTime<Utc>) {
        self.current_play_index = next_index;
        self.last_active_at = Some(now);
    }

    /// Park the cursor at a play that was not processed yet.
    pub fn checkpoint(&mut self, index: usize) {
        self.current_play_index = index;
    }

    /// Mark the replay finished. Stored exactly like a pause at the end.
    pub fn complete(&mut self, sequence_len: usize, now: DateTime<Utc>) {
        self.current_play_index = sequence_len;
        self.is_paused = true;
        self.last_active_at = Some(now);
    }

    pub fn state(&self, sequence_len: usize) -> ReplayState {
        match (self.is_paused, self.current_play_index) {
            (true, idx) if idx >= sequence_len => ReplayState::Completed,
            (true, _) => ReplayState::Paused,
            (false, 0) => ReplayState::Idle,
            (false, _) => ReplayState::Running,
        }
    }

    /// Whether the cursor respects `0 <= idx <= sequence_len`.
    pub fn cursor_within(&self, sequence_len: usize) -> bool {
        self.current_play_index <= sequence_len
    }
}
