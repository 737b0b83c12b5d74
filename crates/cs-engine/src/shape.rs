//! Response shaper
//!
//! Reduces a full remote card document to the fields callers need, keeping
//! get responses inside the configured size ceiling.

use crate::error::{EngineError, EngineResult};
use cs_core::{Card, CollectionRef, ResultField};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Visualization settings kept in shaped output
const VISUALIZATION_KEYS: &[&str] = &[
    "graph.dimensions",
    "graph.metrics",
    "table.pivot_column",
    "table.cell_column",
    "graph.x_axis.scale",
    "stackable.stack_type",
    "series_settings",
];

/// Parameter keys kept in addition to id, name, type and slug
const PARAMETER_OPTIONAL_KEYS: &[&str] = &["target", "default"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorSummary {
    pub id: Option<i64>,
    pub name: String,
}

/// Essential subset of a card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDefinition {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub display: Option<String>,
    pub database_id: Option<i64>,
    pub query_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_settings: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_metadata: Option<Vec<ResultField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_translation: Option<String>,
}

impl CardDefinition {
    /// Whether the card holds an MBQL query
    pub fn is_structured(&self) -> bool {
        self.query_type.as_deref() == Some("query")
            || self
                .dataset_query
                .as_ref()
                .and_then(|dq| dq.get("type"))
                .and_then(Value::as_str)
                == Some("query")
    }

    pub fn to_value(&self) -> EngineResult<Value> {
        serde_json::to_value(self).map_err(|e| EngineError::Internal {
            message: format!("failed to serialize card definition: {}", e),
        })
    }
}

/// Shape a remote card document
pub fn shape_card(document: &Value) -> EngineResult<CardDefinition> {
    let card = Card::from_value(document.clone()).map_err(|e| EngineError::Internal {
        message: format!("unexpected card document: {}", e),
    })?;

    let collection = card.collection.clone();
    let collection_id = if collection.is_none() {
        card.collection_id
    } else {
        None
    };

    Ok(CardDefinition {
        id: card.id,
        name: card.name.clone(),
        description: card.description.clone(),
        card_type: card.card_type.clone(),
        display: card.display.clone(),
        database_id: card.database_id,
        query_type: card.query_type.clone(),
        collection,
        collection_id,
        creator: card.creator.as_ref().map(|c| CreatorSummary {
            id: c.id,
            name: c.display_name(),
        }),
        dataset_query: card.dataset_query.as_ref().and_then(shape_dataset_query),
        visualization_settings: shape_visualization(&card.visualization_settings),
        parameters: (!card.parameters.is_empty())
            .then(|| card.parameters.iter().map(shape_parameter).collect()),
        result_metadata: (!card.result_metadata.is_empty()).then(|| card.result_metadata.clone()),
        dashboard_count: card.dashboard_count.filter(|n| *n > 0),
        sql_translation: None,
    })
}

fn shape_dataset_query(dataset_query: &Value) -> Option<Value> {
    let database = dataset_query.get("database").cloned().unwrap_or(Value::Null);
    match dataset_query.get("type").and_then(Value::as_str)? {
        "native" => {
            let native = dataset_query.get("native");
            let mut block = Map::new();
            block.insert(
                "query".to_string(),
                native
                    .and_then(|n| n.get("query"))
                    .cloned()
                    .unwrap_or(Value::Null),
            );
            if let Some(tags) = native.and_then(|n| n.get("template-tags")) {
                block.insert("template-tags".to_string(), tags.clone());
            }
            Some(json!({"type": "native", "database": database, "native": block}))
        }
        "query" => Some(json!({
            "type": "query",
            "database": database,
            "query": dataset_query.get("query").cloned().unwrap_or_else(|| json!({})),
        })),
        _ => None,
    }
}

fn shape_visualization(settings: &Map<String, Value>) -> Option<Map<String, Value>> {
    if settings.is_empty() {
        return None;
    }
    Some(
        VISUALIZATION_KEYS
            .iter()
            .filter_map(|key| settings.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect(),
    )
}

fn shape_parameter(parameter: &Value) -> Value {
    let mut shaped = Map::new();
    for key in ["id", "name", "type", "slug"] {
        shaped.insert(
            key.to_string(),
            parameter.get(key).cloned().unwrap_or(Value::Null),
        );
    }
    for key in PARAMETER_OPTIONAL_KEYS {
        if let Some(value) = parameter.get(*key) {
            shaped.insert(key.to_string(), value.clone());
        }
    }
    if let Some(source_type) = parameter.get("values_source_type") {
        shaped.insert("values_source_type".to_string(), source_type.clone());
        if let Some(config) = parameter.get("values_source_config") {
            shaped.insert("values_source_config".to_string(), config.clone());
        }
    }
    Value::Object(shaped)
}

#[cfg(test)]
#[path = "shape_test.rs"]
mod tests;
