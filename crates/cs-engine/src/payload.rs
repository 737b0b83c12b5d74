//! Outgoing card payloads

use crate::error::{EngineError, EngineResult};
use cs_core::{CardType, DatasetQuery, ParameterRecord, Patch};
use serde::Serialize;
use serde_json::Value;

/// Parameters written on update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterList {
    /// Freshly processed from caller input
    Processed(Vec<ParameterRecord>),
    /// Carried over verbatim from the persisted card
    Preserved(Vec<Value>),
}

impl ParameterList {
    pub fn len(&self) -> usize {
        match self {
            ParameterList::Processed(records) => records.len(),
            ParameterList::Preserved(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Body of a card creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub display: String,
    pub visualization_settings: Value,
    pub dataset_query: DatasetQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_metadata: Option<Vec<Value>>,
}

/// Body of a partial card update; only supplied fields are serialized
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub description: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub collection_id: Patch<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_settings: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_query: Option<DatasetQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_metadata: Option<Vec<Value>>,
}

impl UpdatePayload {
    pub fn is_empty(&self) -> bool {
        *self == UpdatePayload::default()
    }
}

/// Serialize a payload for the remote API
pub fn to_json<T: Serialize>(payload: &T) -> EngineResult<Value> {
    serde_json::to_value(payload).map_err(|e| EngineError::Internal {
        message: format!("failed to serialize card payload: {}", e),
    })
}
