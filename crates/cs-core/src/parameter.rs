//! Card parameters
//!
//! Callers hand parameters over either as an already-parsed list of records
//! or as a serialized JSON list. [`ParameterInput`] resolves that once at the
//! boundary; [`ParameterInput::normalize`] turns it into an ordered list of
//! raw records for the parameter processor. [`ParameterRecord`] is the
//! processed form persisted on the card.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One caller-supplied parameter record before processing
pub type RawParameter = Map<String, Value>;

/// Parameters as supplied by the caller
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParameterInput {
    /// No parameters supplied; downstream processing is skipped
    #[default]
    Absent,
    /// Pre-parsed ordered records
    List(Vec<RawParameter>),
    /// Serialized JSON list of records
    Serialized(String),
}

impl ParameterInput {
    /// Short description for log lines
    pub fn describe(&self) -> String {
        match self {
            ParameterInput::Absent => "absent".to_string(),
            ParameterInput::List(records) => format!("list({})", records.len()),
            ParameterInput::Serialized(_) => "serialized".to_string(),
        }
    }

    /// Normalize into an ordered list of raw records.
    ///
    /// Returns `None` when parameters were not supplied. Record order is
    /// preserved; it becomes the display order on the persisted card.
    pub fn normalize(self) -> CoreResult<Option<Vec<RawParameter>>> {
        match self {
            ParameterInput::Absent => Ok(None),
            ParameterInput::List(records) => Ok(Some(records)),
            ParameterInput::Serialized(text) => parse_serialized(&text).map(Some),
        }
    }
}

fn parse_serialized(text: &str) -> CoreResult<Vec<RawParameter>> {
    let parsed: Value = serde_json::from_str(text).map_err(|e| CoreError::ParameterParse {
        message: e.to_string(),
    })?;

    let items = match parsed {
        Value::Array(items) => items,
        other => {
            return Err(CoreError::ParameterParse {
                message: format!(
                    "expected a list of parameter objects, got {}",
                    json_kind(&other)
                ),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(CoreError::ParameterParse {
                message: format!(
                    "parameter at index {} must be an object, got {}",
                    index,
                    json_kind(&other)
                ),
            }),
        })
        .collect()
}

/// Human-readable name of a JSON value's kind
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A processed parameter as persisted on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub id: String,
    pub name: String,
    /// Identifier referenced by `{{slug}}` placeholders in native SQL
    pub slug: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_source_config: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_query_type: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Slug of a persisted parameter held as raw JSON
pub fn slug_of(parameter: &Value) -> Option<&str> {
    parameter.get("slug").and_then(Value::as_str)
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
