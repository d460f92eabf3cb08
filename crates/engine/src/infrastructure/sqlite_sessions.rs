//! SQLite-backed replay session storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use playcast_domain::{CommentaryMode, GameId, ReplayInterval, ReplaySession, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{RepoError, ReplaySessionRepo};

pub struct SqliteReplaySessionRepo {
    pool: SqlitePool,
}

impl SqliteReplaySessionRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("replay_sessions.connect", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS replay_sessions (
                user_id TEXT PRIMARY KEY NOT NULL,
                game_id TEXT,
                mode TEXT NOT NULL,
                interval_seconds REAL NOT NULL,
                current_play_index INTEGER NOT NULL,
                is_paused INTEGER NOT NULL,
                last_active_at TEXT
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("replay_sessions.migrate", e))?;

        Ok(Self { pool })
    }
}

fn session_from_row(row: &SqliteRow) -> Result<ReplaySession, RepoError> {
    let user_id: String = row.get("user_id");
    let game_id: Option<String> = row.get("game_id");
    let mode: String = row.get("mode");
    let interval: f64 = row.get("interval_seconds");
    let index: i64 = row.get("current_play_index");
    let last_active_at: Option<String> = row.get("last_active_at");

    let last_active_at = last_active_at
        .map(|ts| {
            DateTime::parse_from_rfc3339(&ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(RepoError::serialization)
        })
        .transpose()?;

    Ok(ReplaySession {
        user_id: UserId::new(user_id).map_err(RepoError::serialization)?,
        game_id: game_id
            .map(GameId::new)
            .transpose()
            .map_err(RepoError::serialization)?,
        mode: mode
            .parse::<CommentaryMode>()
            .map_err(RepoError::serialization)?,
        interval_seconds: ReplayInterval::try_from(interval).map_err(RepoError::serialization)?,
        current_play_index: usize::try_from(index).map_err(RepoError::serialization)?,
        is_paused: row.get::<i64, _>("is_paused") != 0,
        last_active_at,
    })
}

#[async_trait]
impl ReplaySessionRepo for SqliteReplaySessionRepo {
    async fn get(&self, user_id: &UserId) -> Result<Option<ReplaySession>, RepoError> {
        let row = sqlx::query("SELECT * FROM replay_sessions WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("replay_sessions.get", e))?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn save(&self, session: &ReplaySession) -> Result<(), RepoError> {
        let index =
            i64::try_from(session.current_play_index).map_err(RepoError::serialization)?;

        sqlx::query(
            r#"
            INSERT INTO replay_sessions
                (user_id, game_id, mode, interval_seconds, current_play_index, is_paused, last_active_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                game_id = excluded.game_id,
                mode = excluded.mode,
                interval_seconds = excluded.interval_seconds,
                current_play_index = excluded.current_play_index,
                is_paused = excluded.is_paused,
                last_active_at = excluded.last_active_at
            "#,
        )
        .bind(session.user_id.as_str())
        .bind(session.game_id.as_ref().map(|g| g.as_str().to_string()))
        .bind(session.mode.as_str())
        .bind(session.interval_seconds.as_secs_f64())
        .bind(index)
        .bind(i64::from(session.is_paused))
        .bind(session.last_active_at.map(|ts| ts.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("replay_sessions.save", e))?;

        Ok(())
    }
}
