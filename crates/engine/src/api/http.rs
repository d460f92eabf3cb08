//! HTTP routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use playcast_domain::GameSummary;
use serde::Serialize;
use std::sync::Arc;

use crate::api::sse::replay_sse;
use crate::app::App;
use crate::use_cases::games::RecentGamesError;
use crate::use_cases::replay::{ReplayError, ReplayRequest, ResumeOutcome, ResumeRequest};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/game-replay", post(start_replay))
        .route("/game-replay/pause", post(pause_replay))
        .route("/game-replay/resume", post(resume_replay))
        .route("/getLastTenGames", get(recent_games))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Replay
// =============================================================================

/// Acknowledgement for replay requests that do not open a stream.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayAck {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_play_index: Option<usize>,
}

async fn start_replay(
    State(app): State<Arc<App>>,
    payload: Result<Json<ReplayRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let stream = app.use_cases.replay.start.execute(request).await?;
    Ok(replay_sse(stream).into_response())
}

async fn pause_replay(
    State(app): State<Arc<App>>,
    payload: Result<Json<ReplayRequest>, JsonRejection>,
) -> Result<Json<ReplayAck>, ApiError> {
    let Json(request) = payload?;
    let session = app.use_cases.replay.pause.execute(request).await?;
    Ok(Json(ReplayAck {
        status: "paused",
        current_play_index: Some(session.current_play_index),
    }))
}

async fn resume_replay(
    State(app): State<Arc<App>>,
    payload: Result<Json<ResumeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    match app.use_cases.replay.resume.execute(request).await? {
        ResumeOutcome::Resumed(stream) => Ok(replay_sse(stream).into_response()),
        ResumeOutcome::AlreadyRunning => Ok(Json(ReplayAck {
            status: "already running",
            current_play_index: None,
        })
        .into_response()),
    }
}

// =============================================================================
// Games
// =============================================================================

async fn recent_games(State(app): State<Arc<App>>) -> Result<Json<Vec<GameSummary>>, ApiError> {
    let games = app.use_cases.games.recent.execute().await?;
    Ok(Json(games))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: &msg })).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "Internal error",
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<ReplayError> for ApiError {
    fn from(e: ReplayError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<RecentGamesError> for ApiError {
    fn from(e: RecentGamesError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
