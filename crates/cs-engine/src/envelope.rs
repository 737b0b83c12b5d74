//! Response envelopes
//!
//! Every operation answers with an [`Envelope`]: a saved-card summary, a
//! shaped card definition, or a failure rendered from [`EngineError`].

use crate::error::EngineError;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success summary for create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSaved {
    pub success: bool,
    pub card_id: Option<i64>,
    pub name: Option<String>,
    pub parameters_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sql_warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl CardSaved {
    /// Summary of a persisted card document returned by the remote API
    pub fn from_persisted(card: &Value, parameters_count: usize) -> Self {
        Self {
            success: true,
            card_id: card.get("id").and_then(Value::as_i64),
            name: card.get("name").and_then(Value::as_str).map(str::to_string),
            parameters_count,
            sql_warnings: Vec::new(),
            help: None,
        }
    }

    /// Attach advisory warnings; `help` is only set when there are any
    pub fn with_warnings(mut self, warnings: Vec<String>, help: &str) -> Self {
        if !warnings.is_empty() {
            self.help = Some(help.to_string());
        }
        self.sql_warnings = warnings;
        self
    }
}

/// Outcome of one operation
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Saved(CardSaved),
    /// Shaped card document from the get operation
    Definition(Value),
    Failure(EngineError),
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        !matches!(self, Envelope::Failure(_))
    }

    pub fn error(&self) -> Option<&EngineError> {
        match self {
            Envelope::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn saved(&self) -> Option<&CardSaved> {
        match self {
            Envelope::Saved(saved) => Some(saved),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Envelope::Saved(saved) => serde_json::to_value(saved).unwrap_or(Value::Null),
            Envelope::Definition(doc) => doc.clone(),
            Envelope::Failure(err) => err.to_envelope(),
        }
    }

    /// Pretty JSON rendering returned to callers
    pub fn render(&self) -> String {
        render_pretty(&self.to_value())
    }
}

pub(crate) fn render_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

impl From<Result<CardSaved, EngineError>> for Envelope {
    fn from(result: Result<CardSaved, EngineError>) -> Self {
        match result {
            Ok(saved) => Envelope::Saved(saved),
            Err(err) => Envelope::Failure(err),
        }
    }
}

const PARAMETERS_HELP: &str =
    "Each parameter needs a name and a supported type; field filter types also need an integer field_id";
const EXECUTION_HELP: &str =
    "Check your SQL parameter usage. Parameters substitute with proper formatting automatically.";

impl EngineError {
    /// Render the failure envelope for this error
    pub fn to_envelope(&self) -> Value {
        match self {
            EngineError::ParameterParse { message } => json!({
                "success": false,
                "error": "Parameter parsing error",
                "message": message,
            }),
            EngineError::InvalidCardParameters {
                errors,
                parameters_count,
            } => json!({
                "success": false,
                "error": "Invalid card parameters",
                "validation_errors": errors,
                "parameters_count": parameters_count,
                "help": PARAMETERS_HELP,
            }),
            EngineError::StructuralValidation {
                error,
                errors,
                help,
                chart_type,
            } => {
                let mut body = json!({
                    "success": false,
                    "error": error,
                    "validation_errors": errors,
                    "help": help,
                });
                if let Some(chart_type) = chart_type {
                    body["chart_type"] = Value::String(chart_type.clone());
                }
                body
            }
            EngineError::ExecutionValidation {
                error,
                sql_warnings,
            } => {
                let mut body = json!({"success": false, "error": error});
                if !sql_warnings.is_empty() {
                    body["sql_warnings"] = json!(sql_warnings);
                    body["help"] = Value::String(EXECUTION_HELP.to_string());
                }
                body
            }
            EngineError::NoFieldsProvided => json!({
                "success": false,
                "error": "No fields provided for update",
            }),
            EngineError::UnavailableCapability { error, message } => {
                let mut body = self.transport_envelope(error.clone(), None);
                body["message"] = Value::String(message.clone());
                body
            }
            EngineError::InvalidParameter { request_info, .. }
            | EngineError::MissingParameter { request_info, .. }
            | EngineError::Validation { request_info, .. }
            | EngineError::Retrieval { request_info, .. }
            | EngineError::Creation { request_info, .. }
            | EngineError::Update { request_info, .. } => {
                self.transport_envelope(self.message(), request_info.as_ref())
            }
            EngineError::ResponseTooLarge { .. } | EngineError::Internal { .. } => {
                self.transport_envelope(self.message(), None)
            }
        }
    }

    fn transport_envelope(&self, error: String, request_info: Option<&Value>) -> Value {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("status_code".to_string(), Value::from(self.status_code()));
        body.insert(
            "error_type".to_string(),
            Value::String(self.error_type().to_string()),
        );
        body.insert("error".to_string(), Value::String(error));
        if let Some(info) = request_info {
            body.insert("request_info".to_string(), info.clone());
        }
        Value::Object(body)
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
