use crate::error::{AppError, Result};
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Anything that can run a SQL query against the game indexer and hand back rows.
#[async_trait::async_trait]
pub trait SqlQueryService: Send + Sync {
    async fn query(&self, sql: &str) -> Result<Vec<Value>>;

    fn endpoint(&self) -> &str;
}

/// Torii SQL Client
///
/// One attempt per query, bounded by the client timeout. Retries and
/// endpoint fallback are left to the caller.
pub struct ToriiClient {
    sql_url: Url,
    client: reqwest::Client,
}

impl ToriiClient {
    pub fn new(sql_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let sql_url = Url::parse(sql_url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { sql_url, client })
    }

    fn query_url(&self, sql: &str) -> Url {
        let mut url = self.sql_url.clone();
        url.query_pairs_mut().append_pair("query", sql);
        url
    }
}

#[async_trait::async_trait]
impl SqlQueryService for ToriiClient {
    async fn query(&self, sql: &str) -> Result<Vec<Value>> {
        tracing::debug!(endpoint = %self.sql_url, "Torii SQL query: {}", preview(sql));

        let response = self
            .client
            .get(self.query_url(sql))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::ExternalAPI(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::ExternalAPI(format!("Torii returned non-JSON body: {e}")))?;

        if !status.is_success() {
            return Err(AppError::ExternalAPI(format!(
                "Torii returned {status}: {}",
                preview(&body.to_string())
            )));
        }

        rows_from_envelope(body)
    }

    fn endpoint(&self) -> &str {
        self.sql_url.as_str()
    }
}

/// Rows from any of the envelopes Torii has been seen to answer with: a bare
/// array, a JSON-RPC `result`, or a proxied `data` field.
pub fn rows_from_envelope(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => {
            if let Some(error) = map.get("error").filter(|e| !e.is_null()) {
                return Err(AppError::ExternalAPI(format!("Torii error: {error}")));
            }
            for key in ["result", "data"] {
                if let Some(Value::Array(rows)) = map.remove(key) {
                    return Ok(rows);
                }
            }
            Err(AppError::ExternalAPI(
                "Torii response did not contain a row array".to_string(),
            ))
        }
        other => Err(AppError::ExternalAPI(format!(
            "Unexpected Torii response: {}",
            preview(&other.to_string())
        ))),
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 100;
    if text.chars().count() <= LIMIT {
        return text.to_string();
    }
    let head: String = text.chars().take(LIMIT).collect();
    format!("{head}...")
}
