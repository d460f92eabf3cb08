//! Playcast Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playcast_engine::api;
use playcast_engine::infrastructure::{
    chat_completions::ChatCompletionsClient,
    clock::SystemClock,
    config::{EngineConfig, SessionStoreKind},
    memory_sessions::InMemoryReplaySessionRepo,
    player_directory::CachedPlayerDirectory,
    ports::{ClockPort, ReplaySessionRepo},
    resilient_llm::{ResilientLlmClient, RetryConfig},
    sqlite_sessions::SqliteReplaySessionRepo,
    warehouse::WarehousePlaySource,
};
use playcast_engine::use_cases::PlayCommentator;
use playcast_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playcast_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Playcast Engine");

    // Load configuration
    let config = EngineConfig::from_env()?;
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    // Session store
    let sessions: Arc<dyn ReplaySessionRepo> = match &config.session_store {
        SessionStoreKind::Sqlite { path } => {
            tracing::info!(path = %path, "Using SQLite session store");
            Arc::new(SqliteReplaySessionRepo::new(path).await?)
        }
        SessionStoreKind::Memory => {
            tracing::warn!("Using in-memory session store; progress is lost on restart");
            Arc::new(InMemoryReplaySessionRepo::new())
        }
    };

    // Warehouse answers plays, game listings and player names
    tracing::info!(
        project = %config.warehouse.project,
        dataset = %config.warehouse.dataset,
        "Warehouse configured"
    );
    let warehouse = Arc::new(WarehousePlaySource::new(
        config.warehouse.clone(),
        clock.clone(),
    ));
    let players = Arc::new(CachedPlayerDirectory::new(
        warehouse.clone(),
        config.player_cache_capacity,
        config.player_cache_ttl,
    ));

    // Create infrastructure clients
    let llm_client = Arc::new(
        ChatCompletionsClient::new(&config.llm_base_url, &config.llm_model)
            .with_api_key(config.llm_api_key.clone()),
    );
    let retry_config = RetryConfig::default();
    tracing::info!(
        "LLM client configured with retry: model={}, max_retries={}, base_delay_ms={}",
        config.llm_model,
        retry_config.max_retries,
        retry_config.base_delay_ms
    );
    let llm = Arc::new(ResilientLlmClient::new(llm_client, retry_config));
    let commentary = Arc::new(PlayCommentator::new(llm, players));

    // Create application
    let app = Arc::new(App::new(
        sessions,
        warehouse,
        commentary,
        clock,
        config.default_interval,
    ));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    // Browser clients post JSON bodies, which triggers a preflight.
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
