//! In-memory [`CardApi`] fake that records every call

use crate::error::{ApiError, ApiResult};
use crate::traits::{CardApi, QueryExecution};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// One recorded remote call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    FetchCard { id: i64, ignore_view: Option<bool> },
    ExecuteNative { database: i64, sql: String },
    TranslateToSql { database: i64 },
    CreateCard { payload: Value },
    UpdateCard { id: i64, payload: Value },
}

#[derive(Default)]
struct State {
    cards: BTreeMap<i64, Value>,
    next_id: i64,
    execution: Option<QueryExecution>,
    translation: Option<String>,
    fetch_error: Option<ApiError>,
    execute_error: Option<ApiError>,
    translate_error: Option<ApiError>,
    create_error: Option<ApiError>,
    update_error: Option<ApiError>,
    calls: Vec<ApiCall>,
}

/// Recording fake for tests.
///
/// Stored cards are plain JSON. Updates shallow-merge the payload into the
/// stored card; creates assign ids starting at 1 unless seeded higher.
#[derive(Default)]
pub struct RecordingApi {
    state: Mutex<State>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a persisted card; its `id` field is the key
    pub fn with_card(self, card: Value) -> Self {
        {
            let mut state = self.state();
            let id = card.get("id").and_then(Value::as_i64).unwrap_or(0);
            state.next_id = state.next_id.max(id);
            state.cards.insert(id, card);
        }
        self
    }

    /// Script the result of every native execution
    pub fn with_execution(self, execution: QueryExecution) -> Self {
        self.state().execution = Some(execution);
        self
    }

    pub fn with_translation(self, sql: impl Into<String>) -> Self {
        self.state().translation = Some(sql.into());
        self
    }

    pub fn fail_fetch(self, error: ApiError) -> Self {
        self.state().fetch_error = Some(error);
        self
    }

    pub fn fail_execute(self, error: ApiError) -> Self {
        self.state().execute_error = Some(error);
        self
    }

    pub fn fail_translate(self, error: ApiError) -> Self {
        self.state().translate_error = Some(error);
        self
    }

    pub fn fail_create(self, error: ApiError) -> Self {
        self.state().create_error = Some(error);
        self
    }

    pub fn fail_update(self, error: ApiError) -> Self {
        self.state().update_error = Some(error);
        self
    }

    /// All calls in order
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.count(|c| matches!(c, ApiCall::FetchCard { .. }))
    }

    /// SQL passed to every native execution, in order
    pub fn executed_sql(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                ApiCall::ExecuteNative { sql, .. } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any create or update reached the API
    pub fn persisted(&self) -> bool {
        self.count(|c| matches!(c, ApiCall::CreateCard { .. } | ApiCall::UpdateCard { .. })) > 0
    }

    pub fn last_create(&self) -> Option<Value> {
        self.state().calls.iter().rev().find_map(|c| match c {
            ApiCall::CreateCard { payload } => Some(payload.clone()),
            _ => None,
        })
    }

    pub fn last_update(&self) -> Option<(i64, Value)> {
        self.state().calls.iter().rev().find_map(|c| match c {
            ApiCall::UpdateCard { id, payload } => Some((*id, payload.clone())),
            _ => None,
        })
    }

    /// Current stored state of a card
    pub fn card(&self, id: i64) -> Option<Value> {
        self.state().cards.get(&id).cloned()
    }

    fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }
}

fn not_found() -> ApiError {
    ApiError::Http {
        status: 404,
        message: "Not found.".to_string(),
    }
}

#[async_trait]
impl CardApi for RecordingApi {
    async fn fetch_card(&self, id: i64, ignore_view: Option<bool>) -> ApiResult<Value> {
        let mut state = self.state();
        state.calls.push(ApiCall::FetchCard { id, ignore_view });
        if let Some(error) = state.fetch_error.clone() {
            return Err(error);
        }
        state.cards.get(&id).cloned().ok_or_else(not_found)
    }

    async fn execute_native(&self, database: i64, sql: &str) -> ApiResult<QueryExecution> {
        let mut state = self.state();
        state.calls.push(ApiCall::ExecuteNative {
            database,
            sql: sql.to_string(),
        });
        if let Some(error) = state.execute_error.clone() {
            return Err(error);
        }
        Ok(state.execution.clone().unwrap_or(QueryExecution::Completed {
            row_count: 0,
            columns: Vec::new(),
        }))
    }

    async fn translate_to_sql(&self, database: i64, _query: &Value) -> ApiResult<Option<String>> {
        let mut state = self.state();
        state.calls.push(ApiCall::TranslateToSql { database });
        if let Some(error) = state.translate_error.clone() {
            return Err(error);
        }
        Ok(state.translation.clone())
    }

    async fn create_card(&self, payload: &Value) -> ApiResult<Value> {
        let mut state = self.state();
        state.calls.push(ApiCall::CreateCard {
            payload: payload.clone(),
        });
        if let Some(error) = state.create_error.clone() {
            return Err(error);
        }
        state.next_id += 1;
        let id = state.next_id;
        let mut card = payload.as_object().cloned().unwrap_or_default();
        card.insert("id".to_string(), Value::from(id));
        let card = Value::Object(card);
        state.cards.insert(id, card.clone());
        Ok(card)
    }

    async fn update_card(&self, id: i64, payload: &Value) -> ApiResult<Value> {
        let mut state = self.state();
        state.calls.push(ApiCall::UpdateCard {
            id,
            payload: payload.clone(),
        });
        if let Some(error) = state.update_error.clone() {
            return Err(error);
        }
        let stored = state.cards.get_mut(&id).ok_or_else(not_found)?;
        let mut merged: Map<String, Value> = stored.as_object().cloned().unwrap_or_default();
        if let Some(fields) = payload.as_object() {
            for (key, value) in fields {
                merged.insert(key.clone(), value.clone());
            }
        }
        *stored = Value::Object(merged);
        Ok(stored.clone())
    }

    fn api_type(&self) -> &'static str {
        "recording"
    }
}
