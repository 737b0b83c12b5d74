//! Operation inputs

use cs_core::{ParameterInput, Patch};
use serde_json::Value;

/// Inputs for creating a card
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCardRequest {
    pub database_id: i64,
    /// Declared query type, checked before the payload shape
    pub query_type: String,
    /// SQL string for `native`, MBQL object for `query`
    pub query: Value,
    pub name: String,
    pub card_type: String,
    pub collection_id: Option<i64>,
    pub description: Option<String>,
    pub display: String,
    pub visualization_settings: Option<Value>,
    pub parameters: ParameterInput,
}

impl CreateCardRequest {
    /// A `question` card displayed as a table, with no parameters
    pub fn new(
        database_id: i64,
        query_type: impl Into<String>,
        query: Value,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database_id,
            query_type: query_type.into(),
            query,
            name: name.into(),
            card_type: "question".to_string(),
            collection_id: None,
            description: None,
            display: "table".to_string(),
            visualization_settings: None,
            parameters: ParameterInput::Absent,
        }
    }
}

/// Inputs for a partial card update. Omitted fields stay unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateCardRequest {
    pub id: i64,
    pub query_type: Option<String>,
    pub query: Option<Value>,
    pub name: Option<String>,
    pub description: Patch<String>,
    pub collection_id: Patch<i64>,
    pub archived: Option<bool>,
    pub display: Option<String>,
    pub visualization_settings: Option<Value>,
    pub parameters: ParameterInput,
}

impl UpdateCardRequest {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Inputs for retrieving a shaped card definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetCardRequest {
    pub id: i64,
    /// Forwarded to the remote API; `None` leaves it unset
    pub ignore_view: Option<bool>,
    /// Attach the SQL translation of MBQL cards
    pub translate_mbql: bool,
}

impl GetCardRequest {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ignore_view: None,
            translate_mbql: true,
        }
    }
}
