//! Play data from a BigQuery-compatible warehouse over its REST API.
//!
//! All values are bound as named query parameters; only the configured table
//! names are spliced into SQL, and those are checked to be plain identifiers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use playcast_domain::{GameId, GameSummary, PlayRecord, PlayValue, PlayerId};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{
    ClockPort, PlaySourceError, PlaySourcePort, PlayerDirectoryPort,
};

pub const DEFAULT_WAREHOUSE_BASE_URL: &str = "https://bigquery.googleapis.com";

/// Where the warehouse lives and which tables to read.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub base_url: String,
    pub project: String,
    pub dataset: String,
    pub plays_table: String,
    pub players_table: String,
    pub games_table: String,
    /// OAuth bearer token; omitted for emulators that do not check auth
    pub access_token: Option<String>,
    /// How long the warehouse may run a query before answering
    pub query_timeout: Duration,
}

impl WarehouseConfig {
    fn table_ref(&self, table: &str) -> Result<String, PlaySourceError> {
        for part in [&self.project, &self.dataset, &table.to_string()] {
            let valid = !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !valid {
                return Err(PlaySourceError::RequestFailed(format!(
                    "invalid warehouse identifier '{part}'"
                )));
            }
        }
        Ok(format!("`{}.{}.{}`", self.project, self.dataset, table))
    }
}

pub struct WarehousePlaySource {
    client: Client,
    config: WarehouseConfig,
    clock: Arc<dyn ClockPort>,
}

impl WarehousePlaySource {
    pub fn new(config: WarehouseConfig, clock: Arc<dyn ClockPort>) -> Self {
        // Leave headroom above the server-side query timeout for transfer.
        let client = Client::builder()
            .timeout(config.query_timeout + Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            config,
            clock,
        }
    }

    fn queries_url(&self) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/queries",
            self.config.base_url.trim_end_matches('/'),
            self.config.project
        )
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlaySourceError> {
        let request = match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| PlaySourceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlaySourceError::RequestFailed(format!("{status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| PlaySourceError::InvalidResponse(e.to_string()))
    }

    /// Request for the next page of a finished query job.
    fn page_request(&self, job: &JobReference, page_token: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(format!("{}/{}", self.queries_url(), job.job_id))
            .query(&[("pageToken", page_token)]);
        match &job.location {
            Some(location) => request.query(&[("location", location.as_str())]),
            None => request,
        }
    }

    /// Run a query and collect every page of rows.
    async fn query(
        &self,
        sql: String,
        parameters: Vec<QueryParameter>,
    ) -> Result<Vec<PlayRecord>, PlaySourceError> {
        let timeout_ms = self.config.query_timeout.as_millis() as u64;
        let body = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            parameter_mode: "NAMED",
            query_parameters: parameters,
            timeout_ms,
        };

        let first: QueryResponse = self
            .send(self.client.post(self.queries_url()).json(&body))
            .await?;

        if !first.job_complete {
            return Err(PlaySourceError::Timeout);
        }

        let schema = first
            .schema
            .clone()
            .ok_or_else(|| PlaySourceError::InvalidResponse("query result has no schema".into()))?;
        let mut records = decode_rows(&schema, first.rows.unwrap_or_default())?;

        let mut page_token = first.page_token;
        while let Some(token) = page_token.take() {
            let job = first.job_reference.as_ref().ok_or_else(|| {
                PlaySourceError::InvalidResponse("paged result without job reference".into())
            })?;
            let page: QueryResponse = self.send(self.page_request(job, &token)).await?;
            records.extend(decode_rows(&schema, page.rows.unwrap_or_default())?);
            page_token = page.page_token;
        }

        Ok(records)
    }
}

#[async_trait]
impl PlaySourcePort for WarehousePlaySource {
    async fn fetch_plays(&self, game_id: &GameId) -> Result<Vec<PlayRecord>, PlaySourceError> {
        let table = self.config.table_ref(&self.config.plays_table)?;
        let sql = format!(
            "SELECT * FROM {table} WHERE gid = @gid ORDER BY inning, top_bot, nump"
        );

        let plays = self
            .query(sql, vec![QueryParameter::string("gid", game_id.as_str())])
            .await?;
        tracing::debug!(game_id = %game_id, plays = plays.len(), "Fetched plays");
        Ok(plays)
    }

    async fn recent_games(&self, limit: usize) -> Result<Vec<GameSummary>, PlaySourceError> {
        let table = self.config.table_ref(&self.config.games_table)?;
        let sql = format!(
            "SELECT gid, pitteam, batteam FROM {table} WHERE date <= @today ORDER BY date DESC LIMIT @limit"
        );
        let today = self.clock.now().format("%Y%m%d").to_string();

        let rows = self
            .query(
                sql,
                vec![
                    QueryParameter::string("today", &today),
                    QueryParameter::int64("limit", limit as i64),
                ],
            )
            .await?;

        rows.iter()
            .map(|row| {
                let field = |name: &str| {
                    row.display(name)
                        .map_err(|e| PlaySourceError::InvalidResponse(e.to_string()))
                };
                let gid = GameId::new(field("gid")?)
                    .map_err(|e| PlaySourceError::InvalidResponse(e.to_string()))?;
                Ok(GameSummary {
                    gid,
                    pitteam: field("pitteam")?,
                    batteam: field("batteam")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PlayerDirectoryPort for WarehousePlaySource {
    async fn lookup(&self, player_id: &PlayerId) -> Result<Option<String>, PlaySourceError> {
        let table = self.config.table_ref(&self.config.players_table)?;
        let sql = format!("SELECT first, last FROM {table} WHERE id = @id LIMIT 1");

        let rows = self
            .query(sql, vec![QueryParameter::string("id", player_id.as_str())])
            .await?;

        Ok(rows.first().and_then(|row| {
            let first = row.display("first").ok()?;
            let last = row.display("last").ok()?;
            Some(format!("{first} {last}"))
        }))
    }
}

/// Convert REST rows (every cell a string or null) into typed play records.
fn decode_rows(schema: &TableSchema, rows: Vec<TableRow>) -> Result<Vec<PlayRecord>, PlaySourceError> {
    rows.into_iter()
        .map(|row| {
            if row.f.len() != schema.fields.len() {
                return Err(PlaySourceError::InvalidResponse(format!(
                    "row has {} cells but schema has {} fields",
                    row.f.len(),
                    schema.fields.len()
                )));
            }

            let mut record = PlayRecord::new();
            for (field, cell) in schema.fields.iter().zip(row.f) {
                record.push(field.name.clone(), decode_cell(&field.field_type, cell.v));
            }
            Ok(record)
        })
        .collect()
}

fn decode_cell(field_type: &str, raw: Option<serde_json::Value>) -> PlayValue {
    let Some(serde_json::Value::String(text)) = raw else {
        return PlayValue::Null;
    };

    match field_type.to_ascii_uppercase().as_str() {
        "INTEGER" | "INT64" => text
            .parse()
            .map(PlayValue::Int)
            .unwrap_or(PlayValue::Text(text)),
        "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => text
            .parse()
            .map(PlayValue::Float)
            .unwrap_or(PlayValue::Text(text)),
        "BOOLEAN" | "BOOL" => match text.as_str() {
            "true" => PlayValue::Bool(true),
            "false" => PlayValue::Bool(false),
            _ => PlayValue::Text(text),
        },
        _ => PlayValue::Text(text),
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    query: String,
    use_legacy_sql: bool,
    parameter_mode: &'static str,
    query_parameters: Vec<QueryParameter>,
    timeout_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryParameter {
    name: String,
    parameter_type: ParameterType,
    parameter_value: ParameterValue,
}

impl QueryParameter {
    fn string(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            parameter_type: ParameterType { kind: "STRING" },
            parameter_value: ParameterValue {
                value: value.to_string(),
            },
        }
    }

    fn int64(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            parameter_type: ParameterType { kind: "INT64" },
            parameter_value: ParameterValue {
                value: value.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ParameterType {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ParameterValue {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    schema: Option<TableSchema>,
    rows: Option<Vec<TableRow>>,
    page_token: Option<String>,
    job_reference: Option<JobReference>,
}

#[derive(Debug, Clone, Deserialize)]
struct TableSchema {
    fields: Vec<TableField>,
}

#[derive(Debug, Clone, Deserialize)]
struct TableField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    v: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}
