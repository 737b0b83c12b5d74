//! Query definitions
//!
//! A card's query is either native SQL with generated template tags or a
//! structured MBQL tree. [`QueryType`] is the caller-declared tag,
//! [`QueryDefinition`] is the payload once its shape has been checked against
//! that tag, and [`DatasetQuery`] is the wire form persisted on the card.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Template tags of a native query, keyed by placeholder name.
///
/// Kept as raw JSON so tags read back from a persisted card are carried
/// forward verbatim, including keys this crate does not model.
pub type TemplateTags = Map<String, Value>;

/// Declared query type of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Raw templated SQL
    Native,
    /// Structured MBQL expression tree
    Query,
}

impl QueryType {
    /// Wire name of the query type
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Native => "native",
            QueryType::Query => "query",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "native" => Ok(QueryType::Native),
            "query" => Ok(QueryType::Query),
            other => Err(CoreError::InvalidQueryType {
                value: other.to_string(),
            }),
        }
    }
}

/// A query payload whose concrete shape matches its declared type
#[derive(Debug, Clone, PartialEq)]
pub enum QueryDefinition {
    /// SQL text plus the template tags describing its placeholders
    Native {
        sql: String,
        template_tags: TemplateTags,
    },
    /// MBQL tree (the contents of `dataset_query.query`)
    Structured { tree: Map<String, Value> },
}

impl QueryDefinition {
    /// Check a caller-supplied payload against its declared query type.
    ///
    /// Native queries must be a JSON string; structured queries must be a
    /// JSON object. A native definition starts with no template tags.
    pub fn from_payload(query_type: QueryType, payload: Value) -> CoreResult<Self> {
        match (query_type, payload) {
            (QueryType::Native, Value::String(sql)) => Ok(QueryDefinition::Native {
                sql,
                template_tags: TemplateTags::new(),
            }),
            (QueryType::Native, _) => Err(CoreError::QueryShapeMismatch {
                message: "For native query type, query must be a string (SQL)".to_string(),
            }),
            (QueryType::Query, Value::Object(tree)) => Ok(QueryDefinition::Structured { tree }),
            (QueryType::Query, _) => Err(CoreError::QueryShapeMismatch {
                message: "For MBQL query type, query must be an object (MBQL structure)"
                    .to_string(),
            }),
        }
    }

    /// The query type this definition carries
    pub fn query_type(&self) -> QueryType {
        match self {
            QueryDefinition::Native { .. } => QueryType::Native,
            QueryDefinition::Structured { .. } => QueryType::Query,
        }
    }

    /// SQL text for native definitions
    pub fn sql(&self) -> Option<&str> {
        match self {
            QueryDefinition::Native { sql, .. } => Some(sql),
            QueryDefinition::Structured { .. } => None,
        }
    }

    /// Replace the template tags of a native definition.
    ///
    /// Structured definitions have no placeholders and are returned unchanged.
    pub fn with_template_tags(self, tags: TemplateTags) -> Self {
        match self {
            QueryDefinition::Native { sql, .. } => QueryDefinition::Native {
                sql,
                template_tags: tags,
            },
            structured => structured,
        }
    }

    /// Bind the definition to a database, producing the persisted wire form
    pub fn into_dataset_query(self, database: i64) -> DatasetQuery {
        match self {
            QueryDefinition::Native { sql, template_tags } => DatasetQuery::Native {
                database,
                native: NativeQuery {
                    query: sql,
                    template_tags,
                },
            },
            QueryDefinition::Structured { tree } => DatasetQuery::Query {
                database,
                query: tree,
            },
        }
    }
}

/// Wire form of a card's `dataset_query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatasetQuery {
    Native { database: i64, native: NativeQuery },
    Query {
        database: i64,
        query: Map<String, Value>,
    },
}

impl DatasetQuery {
    /// Database the query runs against
    pub fn database(&self) -> i64 {
        match self {
            DatasetQuery::Native { database, .. } | DatasetQuery::Query { database, .. } => {
                *database
            }
        }
    }

    pub fn query_type(&self) -> QueryType {
        match self {
            DatasetQuery::Native { .. } => QueryType::Native,
            DatasetQuery::Query { .. } => QueryType::Query,
        }
    }
}

/// The `native` block of a dataset query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeQuery {
    pub query: String,
    #[serde(rename = "template-tags", default)]
    pub template_tags: TemplateTags,
}

/// Metadata for one placeholder referenced in a native query body.
///
/// Generated from declared parameters, never authored by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateTag {
    pub id: String,
    pub name: String,
    #[serde(rename = "display-name")]
    pub display_name: String,
    #[serde(rename = "type")]
    pub tag_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Field reference for field-filter (`dimension`) tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Value>,
    #[serde(
        rename = "widget-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub widget_type: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<TemplateTag> for Value {
    fn from(tag: TemplateTag) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(tag.id));
        map.insert("name".to_string(), Value::String(tag.name));
        map.insert("display-name".to_string(), Value::String(tag.display_name));
        map.insert("type".to_string(), Value::String(tag.tag_type));
        if let Some(default) = tag.default {
            map.insert("default".to_string(), default);
        }
        if tag.required {
            map.insert("required".to_string(), Value::Bool(true));
        }
        if let Some(dimension) = tag.dimension {
            map.insert("dimension".to_string(), dimension);
        }
        if let Some(widget_type) = tag.widget_type {
            map.insert("widget-type".to_string(), Value::String(widget_type));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
