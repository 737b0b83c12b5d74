//! Card API trait definition

use crate::error::ApiResult;
use async_trait::async_trait;
use serde_json::Value;

/// Outcome of executing a native query for validation
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExecution {
    /// The database ran the query
    Completed {
        row_count: u64,
        /// Column metadata reported by the database
        columns: Vec<Value>,
    },
    /// The database rejected the query; `error` is its own message
    Failed { error: String },
}

/// Remote card API consumed by the engine
///
/// Implementations must be Send + Sync for async operation. Every call is a
/// single request with no retries.
#[async_trait]
pub trait CardApi: Send + Sync {
    /// Fetch the full persisted representation of a card
    async fn fetch_card(&self, id: i64, ignore_view: Option<bool>) -> ApiResult<Value>;

    /// Execute SQL against a database with no template tags.
    ///
    /// A database-level rejection is `Ok(QueryExecution::Failed)`; an `Err`
    /// means the request itself failed.
    async fn execute_native(&self, database: i64, sql: &str) -> ApiResult<QueryExecution>;

    /// Translate an MBQL tree into SQL. `Ok(None)` when no SQL came back.
    async fn translate_to_sql(&self, database: i64, query: &Value) -> ApiResult<Option<String>>;

    /// Create a card, returning the persisted representation
    async fn create_card(&self, payload: &Value) -> ApiResult<Value>;

    /// Apply a partial update to a card, returning the persisted representation
    async fn update_card(&self, id: i64, payload: &Value) -> ApiResult<Value>;

    /// Backend identifier for logging
    fn api_type(&self) -> &'static str;
}
