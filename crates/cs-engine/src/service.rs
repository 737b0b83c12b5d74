//! Card operations

use crate::envelope::{render_pretty, CardSaved, Envelope};
use crate::error::{EngineError, EngineResult};
use crate::payload::{self, CreatePayload};
use crate::pipeline;
use crate::reconcile::{self, card_request_info};
use crate::request::{CreateCardRequest, GetCardRequest, UpdateCardRequest};
use crate::shape::shape_card;
use cs_api::CardApi;
use cs_core::{Capabilities, Config, QueryDefinition, ResponseConfig};
use serde_json::{json, Value};
use std::sync::Arc;

const CREATED_WITH_WARNINGS: &str =
    "Card created successfully, but check SQL parameter usage warnings above.";
const UPDATED_WITH_WARNINGS: &str =
    "Card updated successfully, but check SQL parameter usage warnings above.";

/// Create, update and retrieve cards through a [`CardApi`].
///
/// Holds no per-call state; every operation fetches what it needs.
pub struct CardService {
    api: Arc<dyn CardApi>,
    capabilities: Capabilities,
    max_response_bytes: usize,
}

impl CardService {
    pub fn new(api: Arc<dyn CardApi>) -> Self {
        log::debug!("card service over {} API", api.api_type());
        Self {
            api,
            capabilities: Capabilities::default(),
            max_response_bytes: ResponseConfig::default().max_size_bytes,
        }
    }

    pub fn from_config(api: Arc<dyn CardApi>, config: &Config) -> Self {
        Self::new(api)
            .with_capabilities(config.capabilities)
            .with_max_response_bytes(config.response.max_size_bytes)
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Validate and create a card
    pub async fn create(&self, request: CreateCardRequest) -> Envelope {
        log::info!(
            "create card '{}' (database {}, query_type {}, parameters {})",
            request.name,
            request.database_id,
            request.query_type,
            request.parameters.describe()
        );
        let result = self.try_create(request).await;
        if let Err(err) = &result {
            log::warn!("create failed: {}", err);
        }
        Envelope::from(result)
    }

    async fn try_create(&self, request: CreateCardRequest) -> EngineResult<CardSaved> {
        let database = request.database_id;
        let input_info = json!({"database_id": database, "name": request.name});

        let query_type = pipeline::check_query_type(&request.query_type)
            .map_err(|e| e.with_request_info(input_info.clone()))?;
        let definition = pipeline::check_query(query_type, request.query, &self.capabilities)
            .map_err(|e| {
                e.with_request_info(
                    json!({"database_id": database, "query_type": query_type.as_str()}),
                )
            })?;
        let card_type = pipeline::check_card_type(&request.card_type)
            .map_err(|e| e.with_request_info(input_info))?;
        if let Some(settings) = &request.visualization_settings {
            pipeline::check_visualization(&request.display, settings)?;
        }
        let processed = pipeline::process(request.parameters, &self.capabilities)?;

        let mut sql_warnings = Vec::new();
        let mut result_metadata = None;
        let definition = match definition {
            QueryDefinition::Native { sql, .. } => {
                if let Some(processed) = processed.as_ref().filter(|p| !p.parameters.is_empty()) {
                    sql_warnings = pipeline::declared_warnings(&sql, processed.slugs());
                }
                let columns =
                    pipeline::execute(self.api.as_ref(), database, &sql, &sql_warnings).await?;
                result_metadata = Some(columns);
                let template_tags = processed
                    .as_ref()
                    .map(|p| p.template_tags.clone())
                    .unwrap_or_default();
                QueryDefinition::Native { sql, template_tags }
            }
            structured => structured,
        };

        let parameters_count = processed.as_ref().map_or(0, |p| p.parameters.len());
        let body = CreatePayload {
            name: request.name,
            card_type,
            display: request.display,
            visualization_settings: request
                .visualization_settings
                .unwrap_or_else(|| json!({})),
            dataset_query: definition.into_dataset_query(database),
            parameters: processed.map(|p| p.parameters),
            description: request.description.filter(|d| !d.is_empty()),
            collection_id: request.collection_id,
            result_metadata,
        };

        let created = self
            .api
            .create_card(&payload::to_json(&body)?)
            .await
            .map_err(|e| {
                EngineError::creation(&e, json!({"endpoint": "/api/card", "method": "POST"}))
            })?;

        let saved = CardSaved::from_persisted(&created, parameters_count)
            .with_warnings(sql_warnings, CREATED_WITH_WARNINGS);
        log::info!("created card {:?}", saved.card_id);
        Ok(saved)
    }

    /// Validate and apply a partial update
    pub async fn update(&self, request: UpdateCardRequest) -> Envelope {
        log::info!(
            "update card {} (query_type {:?}, name {:?}, display {:?}, parameters {})",
            request.id,
            request.query_type,
            request.name,
            request.display,
            request.parameters.describe()
        );
        let result = self.try_update(request).await;
        if let Err(err) = &result {
            log::warn!("update failed: {}", err);
        }
        Envelope::from(result)
    }

    async fn try_update(&self, request: UpdateCardRequest) -> EngineResult<CardSaved> {
        let id = request.id;
        let reconciled =
            reconcile::reconcile_update(self.api.as_ref(), &self.capabilities, request).await?;

        let updated = self
            .api
            .update_card(id, &payload::to_json(&reconciled.payload)?)
            .await
            .map_err(|e| EngineError::update(&e, card_request_info(id, "PUT")))?;

        Ok(CardSaved::from_persisted(&updated, reconciled.parameters_count)
            .with_warnings(reconciled.sql_warnings, UPDATED_WITH_WARNINGS))
    }

    /// Retrieve a shaped, size-bounded card definition
    pub async fn get(&self, request: GetCardRequest) -> Envelope {
        log::info!(
            "get card {} (ignore_view {:?}, translate_mbql {})",
            request.id,
            request.ignore_view,
            request.translate_mbql
        );
        match self.try_get(request).await {
            Ok(document) => Envelope::Definition(document),
            Err(err) => {
                log::warn!("get failed: {}", err);
                Envelope::Failure(err)
            }
        }
    }

    async fn try_get(&self, request: GetCardRequest) -> EngineResult<Value> {
        let id = request.id;
        let document = self
            .api
            .fetch_card(id, request.ignore_view)
            .await
            .map_err(|e| {
                let mut info = card_request_info(id, "GET");
                info["params"] = match request.ignore_view {
                    Some(flag) => json!({"ignore_view": flag.to_string()}),
                    None => json!({}),
                };
                EngineError::retrieval(&e, e.message(), info)
            })?;

        let mut definition = shape_card(&document)?;
        if request.translate_mbql && definition.is_structured() {
            definition.sql_translation = self.translate(&document).await;
        }

        let value = definition.to_value()?;
        let size = render_pretty(&value).len();
        if size > self.max_response_bytes {
            return Err(EngineError::ResponseTooLarge {
                size,
                limit: self.max_response_bytes,
            });
        }
        Ok(value)
    }

    /// SQL translation of an MBQL card; failures are logged and omitted
    async fn translate(&self, document: &Value) -> Option<String> {
        let dataset_query = document.get("dataset_query")?;
        let Some(database) = dataset_query.get("database").and_then(Value::as_i64) else {
            log::warn!("Cannot translate MBQL to SQL: card has no database");
            return None;
        };
        let query = dataset_query.get("query").cloned().unwrap_or_else(|| json!({}));
        match self.api.translate_to_sql(database, &query).await {
            Ok(sql) => sql,
            Err(err) => {
                log::warn!("Failed to translate MBQL to SQL: {}", err);
                None
            }
        }
    }
}
