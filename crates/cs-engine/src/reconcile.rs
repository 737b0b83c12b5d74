//! Update reconciler
//!
//! Turns an [`UpdateCardRequest`] into the partial payload sent to the
//! remote API. Only supplied fields are written. When the query body changes
//! without new parameters, the persisted parameters and template tags are
//! carried over verbatim. New parameters replace the template tags wholesale.
//!
//! The persisted card is fetched lazily, at most once per update, and only
//! when a rule actually needs it.

use crate::error::{EngineError, EngineResult};
use crate::payload::{ParameterList, UpdatePayload};
use crate::pipeline;
use crate::request::UpdateCardRequest;
use cs_api::CardApi;
use cs_core::parameter::slug_of;
use cs_core::{Capabilities, Card, QueryDefinition, QueryType};
use serde_json::{json, Value};

/// Why the persisted card is being fetched; selects the failure message
#[derive(Debug, Clone, Copy)]
enum FetchPurpose {
    Visualization,
    Update,
}

/// Memoized view of the persisted card
struct CurrentCard<'a> {
    api: &'a dyn CardApi,
    id: i64,
    card: Option<Card>,
}

impl<'a> CurrentCard<'a> {
    fn new(api: &'a dyn CardApi, id: i64) -> Self {
        Self { api, id, card: None }
    }

    async fn get(&mut self, purpose: FetchPurpose) -> EngineResult<&Card> {
        if self.card.is_none() {
            let document = self.api.fetch_card(self.id, None).await.map_err(|e| {
                let message = match purpose {
                    FetchPurpose::Visualization => format!(
                        "Cannot validate visualization settings for card {}: {}",
                        self.id,
                        e.message()
                    ),
                    FetchPurpose::Update => {
                        format!("Cannot update card {}: {}", self.id, e.message())
                    }
                };
                EngineError::retrieval(&e, message, card_request_info(self.id, "GET"))
            })?;
            let card = Card::from_value(document).map_err(|e| EngineError::Internal {
                message: format!("unexpected card document for card {}: {}", self.id, e),
            })?;
            self.card = Some(card);
        }
        self.card.as_ref().ok_or_else(|| EngineError::Internal {
            message: format!("card {} was not loaded", self.id),
        })
    }
}

pub(crate) fn card_request_info(id: i64, method: &str) -> Value {
    json!({"endpoint": format!("/api/card/{}", id), "method": method})
}

/// A reconciled update ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledUpdate {
    pub payload: UpdatePayload,
    /// Processed count, else preserved count, else zero
    pub parameters_count: usize,
    pub sql_warnings: Vec<String>,
}

/// Validate an update request and compute its payload
pub async fn reconcile_update(
    api: &dyn CardApi,
    capabilities: &Capabilities,
    request: UpdateCardRequest,
) -> EngineResult<ReconciledUpdate> {
    let id = request.id;
    let mut current = CurrentCard::new(api, id);

    let query_type = request
        .query_type
        .as_deref()
        .map(pipeline::check_query_type)
        .transpose()
        .map_err(|e| e.with_request_info(json!({"card_id": id})))?;

    let definition = match (request.query, query_type) {
        (Some(_), None) => {
            return Err(EngineError::MissingParameter {
                message: "query_type parameter is required when query is provided".to_string(),
                request_info: Some(json!({"card_id": id})),
            })
        }
        (Some(query), Some(query_type)) => Some(
            pipeline::check_query(query_type, query, capabilities).map_err(|e| {
                e.with_request_info(json!({"card_id": id, "query_type": query_type.as_str()}))
            })?,
        ),
        (None, _) => None,
    };

    if let Some(settings) = &request.visualization_settings {
        let chart_type = match &request.display {
            Some(display) => display.clone(),
            None => current
                .get(FetchPurpose::Visualization)
                .await?
                .display
                .clone()
                .unwrap_or_else(|| "table".to_string()),
        };
        pipeline::check_visualization(&chart_type, settings)?;
    }

    let processed = pipeline::process(request.parameters, capabilities)?;

    let mut payload = UpdatePayload {
        name: request.name,
        description: request.description,
        collection_id: request.collection_id,
        archived: request.archived,
        display: request.display,
        visualization_settings: request.visualization_settings,
        ..UpdatePayload::default()
    };
    let mut sql_warnings = Vec::new();

    match (&definition, &processed) {
        (Some(_), None) => {
            let card = current.get(FetchPurpose::Update).await?;
            if !card.parameters.is_empty() {
                log::info!(
                    "Preserving {} existing parameter(s) for card {} during query update",
                    card.parameters.len(),
                    id
                );
                payload.parameters = Some(ParameterList::Preserved(card.parameters.clone()));
            }
        }
        (_, Some(processed)) => {
            payload.parameters = Some(ParameterList::Processed(processed.parameters.clone()));
        }
        (None, None) => {}
    }

    if let Some(definition) = definition {
        let card = current.get(FetchPurpose::Update).await?;
        let database = card.database().ok_or_else(|| EngineError::Validation {
            message: "Cannot update query: database_id not found in existing card".to_string(),
            request_info: Some(card_request_info(id, "PUT")),
        })?;

        if let QueryDefinition::Native { sql, .. } = &definition {
            sql_warnings = match (&processed, &payload.parameters) {
                (Some(processed), _) => pipeline::declared_warnings(sql, processed.slugs()),
                (None, Some(ParameterList::Preserved(preserved))) => {
                    pipeline::preserved_warnings(sql, preserved.iter().filter_map(slug_of))
                }
                _ => Vec::new(),
            };
            let template_tags = match &processed {
                Some(processed) => processed.template_tags.clone(),
                None => card.native_template_tags(),
            };
            let columns = pipeline::execute(api, database, sql, &sql_warnings).await?;
            payload.result_metadata = Some(columns);
            payload.dataset_query =
                Some(definition.with_template_tags(template_tags).into_dataset_query(database));
        } else {
            payload.dataset_query = Some(definition.into_dataset_query(database));
        }
    } else if let Some(processed) = &processed {
        // New parameters on a native card re-emit the stored SQL with the new tags
        let card = current.get(FetchPurpose::Update).await?;
        if card.persisted_query_type() == Some(QueryType::Native) {
            if let Some(sql) = card.native_sql() {
                let database = card.database().ok_or_else(|| EngineError::Validation {
                    message: "Cannot update template tags: database_id not found in existing card"
                        .to_string(),
                    request_info: Some(card_request_info(id, "PUT")),
                })?;
                sql_warnings = pipeline::declared_warnings(sql, processed.slugs());
                payload.dataset_query = Some(
                    QueryDefinition::Native {
                        sql: sql.to_string(),
                        template_tags: processed.template_tags.clone(),
                    }
                    .into_dataset_query(database),
                );
            }
        }
    }

    if payload.is_empty() {
        return Err(EngineError::NoFieldsProvided);
    }

    let parameters_count = match (&processed, &payload.parameters) {
        (Some(processed), _) => processed.parameters.len(),
        (None, Some(list)) => list.len(),
        (None, None) => 0,
    };

    Ok(ReconciledUpdate {
        payload,
        parameters_count,
        sql_warnings,
    })
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
