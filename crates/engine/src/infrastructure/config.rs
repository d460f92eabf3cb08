//! Engine configuration from environment variables.

use std::time::Duration;

use playcast_domain::ReplayInterval;

use crate::infrastructure::chat_completions::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL};
use crate::infrastructure::warehouse::{WarehouseConfig, DEFAULT_WAREHOUSE_BASE_URL};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Which session store backs replay progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreKind {
    Memory,
    Sqlite { path: String },
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub warehouse: WarehouseConfig,
    pub session_store: SessionStoreKind,
    /// Interval given to sessions that have never been configured
    pub default_interval: ReplayInterval,
    pub player_cache_capacity: usize,
    pub player_cache_ttl: Duration,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name -> value lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let server_port = match var("SERVER_PORT").or_else(|| var("PORT")) {
            Some(raw) => parse("SERVER_PORT", raw)?,
            None => 3000,
        };

        let default_interval = match var("DEFAULT_INTERVAL_SECONDS") {
            Some(raw) => {
                let secs: f64 = parse("DEFAULT_INTERVAL_SECONDS", raw.clone())?;
                ReplayInterval::from_secs(secs).map_err(|e| ConfigError::Invalid {
                    name: "DEFAULT_INTERVAL_SECONDS",
                    value: raw,
                    reason: e.to_string(),
                })?
            }
            None => ReplayInterval::default(),
        };

        let warehouse_timeout: u64 = match var("WAREHOUSE_TIMEOUT_SECONDS") {
            Some(raw) => parse("WAREHOUSE_TIMEOUT_SECONDS", raw)?,
            None => 10,
        };

        let plays_table = or("WAREHOUSE_PLAYS_TABLE", "2023-2024-plays");
        let warehouse = WarehouseConfig {
            base_url: or("WAREHOUSE_BASE_URL", DEFAULT_WAREHOUSE_BASE_URL),
            project: or("WAREHOUSE_PROJECT", "playcast-local"),
            dataset: or("WAREHOUSE_DATASET", "baseball_custom_dataset"),
            players_table: or("WAREHOUSE_PLAYERS_TABLE", "2023-2024-players"),
            games_table: or("WAREHOUSE_GAMES_TABLE", &plays_table),
            plays_table,
            access_token: var("WAREHOUSE_ACCESS_TOKEN"),
            query_timeout: Duration::from_secs(warehouse_timeout),
        };

        let session_store = match var("SESSION_STORE").as_deref() {
            None | Some("sqlite") => SessionStoreKind::Sqlite {
                path: or("SESSION_DB", "sessions.db"),
            },
            Some("memory") => SessionStoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "SESSION_STORE",
                    value: other.to_string(),
                    reason: "expected 'sqlite' or 'memory'".into(),
                })
            }
        };

        let player_cache_capacity = match var("PLAYER_CACHE_CAPACITY") {
            Some(raw) => parse("PLAYER_CACHE_CAPACITY", raw)?,
            None => 1024,
        };
        let player_cache_ttl = match var("PLAYER_CACHE_TTL_SECONDS") {
            Some(raw) => Duration::from_secs(parse("PLAYER_CACHE_TTL_SECONDS", raw)?),
            None => Duration::from_secs(3600),
        };

        Ok(Self {
            server_host: or("SERVER_HOST", "0.0.0.0"),
            server_port,
            llm_base_url: or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            llm_model: or("LLM_MODEL", DEFAULT_LLM_MODEL),
            llm_api_key: var("LLM_API_KEY"),
            warehouse,
            session_store,
            default_interval,
            player_cache_capacity,
            player_cache_ttl,
        })
    }
}

fn parse<T>(name: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value: raw,
    })
}
