//! Metabase HTTP client

use crate::error::{ApiError, ApiResult};
use crate::traits::{CardApi, QueryExecution};
use async_trait::async_trait;
use cs_core::Config;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-api-key";

/// [`CardApi`] over the Metabase REST API
pub struct MetabaseClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl MetabaseClient {
    /// Create a client for `base_url` (without the `/api` suffix)
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            log::warn!(
                "No API key configured (set metabase.api_key or ${}); requests will be unauthenticated",
                config.metabase.api_key_env
            );
        }
        Self::new(
            &config.metabase.url,
            api_key,
            Duration::from_secs(config.metabase.timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.endpoint(path));
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Value> {
        let response = builder.send().await?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> ApiResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Http {
            status: status.as_u16(),
            message: error_message(status, &text),
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Error text for a failed response: the body's `message` or `error`
/// string when present, else the raw body, else the status reason.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(text) = body_error_text(&parsed) {
            return text;
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {}: {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}

fn body_error_text(body: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// Interpret a successful `/api/dataset` response.
///
/// The endpoint answers 2xx even when the database rejected the query; the
/// body then carries `status: "failed"` and the database's error text.
pub(crate) fn interpret_dataset_response(body: &Value) -> QueryExecution {
    if body.get("status").and_then(Value::as_str) == Some("failed") {
        let error = body_error_text(body).unwrap_or_else(|| "Query execution failed".to_string());
        return QueryExecution::Failed { error };
    }
    let columns = body
        .get("data")
        .and_then(|d| d.get("cols"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let row_count = body.get("row_count").and_then(Value::as_u64).unwrap_or(0);
    QueryExecution::Completed { row_count, columns }
}

#[async_trait]
impl CardApi for MetabaseClient {
    async fn fetch_card(&self, id: i64, ignore_view: Option<bool>) -> ApiResult<Value> {
        let mut builder = self.request(Method::GET, &format!("card/{}", id));
        if let Some(ignore_view) = ignore_view {
            builder = builder.query(&[("ignore_view", ignore_view.to_string())]);
        }
        log::debug!("GET /api/card/{}", id);
        self.send(builder).await
    }

    async fn execute_native(&self, database: i64, sql: &str) -> ApiResult<QueryExecution> {
        let body = json!({
            "database": database,
            "type": "native",
            "native": {"query": sql, "template-tags": {}}
        });
        log::debug!("POST /api/dataset (database {})", database);
        let response = self
            .request(Method::POST, "dataset")
            .json(&body)
            .send()
            .await?;
        match read_json(response).await {
            Ok(body) => Ok(interpret_dataset_response(&body)),
            // A 4xx with a message is the database rejecting the SQL
            Err(ApiError::Http { status, message }) if status < 500 => {
                Ok(QueryExecution::Failed { error: message })
            }
            Err(e) => Err(e),
        }
    }

    async fn translate_to_sql(&self, database: i64, query: &Value) -> ApiResult<Option<String>> {
        let body = json!({"database": database, "type": "query", "query": query});
        log::debug!("POST /api/dataset/native (database {})", database);
        let response = self
            .send(self.request(Method::POST, "dataset/native").json(&body))
            .await?;
        Ok(response
            .get("query")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn create_card(&self, payload: &Value) -> ApiResult<Value> {
        log::debug!("POST /api/card");
        self.send(self.request(Method::POST, "card").json(payload)).await
    }

    async fn update_card(&self, id: i64, payload: &Value) -> ApiResult<Value> {
        log::debug!("PUT /api/card/{}", id);
        let builder = self.request(Method::PUT, &format!("card/{}", id));
        self.send(builder.json(payload)).await
    }

    fn api_type(&self) -> &'static str {
        "metabase"
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
