//! Remote card representation
//!
//! [`Card`] is the subset of the remote card document the engine reads:
//! identity and metadata, the raw `dataset_query`, parameters kept as raw
//! JSON (so they can be carried into updates verbatim), and result metadata
//! reduced to the fields callers need.

use crate::error::{CoreError, CoreResult};
use crate::query::{QueryType, TemplateTags};
use crate::serde_helpers::null_as_default;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    #[default]
    Question,
    Model,
    Metric,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Question => "question",
            CardType::Model => "model",
            CardType::Metric => "metric",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "question" => Ok(CardType::Question),
            "model" => Ok(CardType::Model),
            "metric" => Ok(CardType::Metric),
            other => Err(CoreError::InvalidCardType {
                value: other.to_string(),
            }),
        }
    }
}

/// A card as returned by the remote API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Card type as reported remotely (question, model, metric)
    #[serde(rename = "type", default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub database_id: Option<i64>,
    #[serde(default)]
    pub query_type: Option<String>,
    #[serde(default)]
    pub collection: Option<CollectionRef>,
    #[serde(default)]
    pub collection_id: Option<i64>,
    #[serde(default)]
    pub creator: Option<Creator>,
    #[serde(default)]
    pub dataset_query: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visualization_settings: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result_metadata: Vec<ResultField>,
    #[serde(default)]
    pub dashboard_count: Option<i64>,
    #[serde(default)]
    pub archived: Option<bool>,
}

impl Card {
    /// Decode a card from the remote JSON document
    pub fn from_value(value: Value) -> CoreResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Query type of the persisted query, preferring the `dataset_query` tag
    pub fn persisted_query_type(&self) -> Option<QueryType> {
        self.dataset_query
            .as_ref()
            .and_then(|dq| dq.get("type"))
            .and_then(Value::as_str)
            .or(self.query_type.as_deref())
            .and_then(|t| t.parse().ok())
    }

    /// Database the persisted query runs against
    pub fn database(&self) -> Option<i64> {
        self.dataset_query
            .as_ref()
            .and_then(|dq| dq.get("database"))
            .and_then(Value::as_i64)
            .or(self.database_id)
    }

    /// SQL text of a persisted native query
    pub fn native_sql(&self) -> Option<&str> {
        self.native_block()
            .and_then(|native| native.get("query"))
            .and_then(Value::as_str)
    }

    /// Template tags of a persisted native query, verbatim
    pub fn native_template_tags(&self) -> TemplateTags {
        self.native_block()
            .and_then(|native| native.get("template-tags"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    fn native_block(&self) -> Option<&Value> {
        self.dataset_query.as_ref().and_then(|dq| dq.get("native"))
    }
}

/// Collection a card lives in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionRef {
    /// Numeric id, or a string such as `"root"`
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// User who created a card
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Creator {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Creator {
    /// Precomposed name if present, else first and last name joined
    pub fn display_name(&self) -> String {
        if let Some(name) = self.common_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Result column metadata, reduced to the fields responses carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub semantic_type: Option<String>,
}

#[cfg(test)]
#[path = "card_test.rs"]
mod tests;
