//! Error types for cs-engine

use cs_api::ApiError;
use cs_core::CoreError;
use serde_json::Value;
use thiserror::Error;

/// Fatal outcome of a card operation.
///
/// Every variant short-circuits the operation and is reported to the caller
/// as a failure envelope (see [`EngineError::to_envelope`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed or inconsistent caller input (C001)
    #[error("[C001] {message}")]
    InvalidParameter {
        message: String,
        request_info: Option<Value>,
    },

    /// A required companion input is missing (C002)
    #[error("[C002] {message}")]
    MissingParameter {
        message: String,
        request_info: Option<Value>,
    },

    /// Serialized parameter list could not be parsed (C003)
    #[error("[C003] Parameter parsing error: {message}")]
    ParameterParse { message: String },

    /// Parameter records failed processing (C004)
    #[error("[C004] Invalid card parameters: {}", .errors.join("; "))]
    InvalidCardParameters {
        errors: Vec<String>,
        parameters_count: usize,
    },

    /// MBQL or visualization-settings violation (C005)
    #[error("[C005] {error}: {}", .errors.join("; "))]
    StructuralValidation {
        error: String,
        errors: Vec<String>,
        help: String,
        chart_type: Option<String>,
    },

    /// The database rejected the SQL (C006)
    #[error("[C006] {error}")]
    ExecutionValidation {
        error: String,
        sql_warnings: Vec<String>,
    },

    /// Persisted state cannot support the requested change (C007)
    #[error("[C007] {message}")]
    Validation {
        message: String,
        request_info: Option<Value>,
    },

    /// Card retrieval failed (C008)
    #[error("[C008] {message}")]
    Retrieval {
        status: u16,
        message: String,
        request_info: Option<Value>,
    },

    /// Card creation failed (C009)
    #[error("[C009] {message}")]
    Creation {
        status: u16,
        message: String,
        request_info: Option<Value>,
    },

    /// Card update failed (C010)
    #[error("[C010] {message}")]
    Update {
        status: u16,
        message: String,
        request_info: Option<Value>,
    },

    /// A capability the operation needs is disabled (C011)
    #[error("[C011] {error}: {message}")]
    UnavailableCapability { error: String, message: String },

    /// Update computed an empty payload (C012)
    #[error("[C012] No fields provided for update")]
    NoFieldsProvided,

    /// Serialized response exceeds the configured ceiling (C013)
    #[error("[C013] Response size ({size} bytes) exceeds maximum allowed size ({limit} bytes)")]
    ResponseTooLarge { size: usize, limit: usize },

    /// Unexpected failure caught at the operation boundary (C014)
    #[error("[C014] {message}")]
    Internal { message: String },
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn retrieval(err: &ApiError, message: String, request_info: Value) -> Self {
        EngineError::Retrieval {
            status: err.status_code(),
            message,
            request_info: Some(request_info),
        }
    }

    pub fn creation(err: &ApiError, request_info: Value) -> Self {
        EngineError::Creation {
            status: err.status_code(),
            message: err.message(),
            request_info: Some(request_info),
        }
    }

    pub fn update(err: &ApiError, request_info: Value) -> Self {
        EngineError::Update {
            status: err.status_code(),
            message: err.message(),
            request_info: Some(request_info),
        }
    }

    /// Attach request context to input errors that carry none yet
    pub fn with_request_info(mut self, info: Value) -> Self {
        match &mut self {
            EngineError::InvalidParameter { request_info, .. }
            | EngineError::MissingParameter { request_info, .. }
            | EngineError::Validation { request_info, .. } => {
                if request_info.is_none() {
                    *request_info = Some(info);
                }
            }
            _ => {}
        }
        self
    }

    /// HTTP-like status reported in the envelope
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::InvalidParameter { .. }
            | EngineError::MissingParameter { .. }
            | EngineError::ParameterParse { .. }
            | EngineError::InvalidCardParameters { .. }
            | EngineError::StructuralValidation { .. }
            | EngineError::ExecutionValidation { .. }
            | EngineError::Validation { .. }
            | EngineError::NoFieldsProvided => 400,
            EngineError::Retrieval { status, .. }
            | EngineError::Creation { status, .. }
            | EngineError::Update { status, .. } => *status,
            EngineError::UnavailableCapability { .. } => 503,
            EngineError::ResponseTooLarge { .. } => 413,
            EngineError::Internal { .. } => 500,
        }
    }

    /// Machine-readable error class
    pub fn error_type(&self) -> &'static str {
        match self {
            EngineError::InvalidParameter { .. } => "invalid_parameter",
            EngineError::MissingParameter { .. } => "missing_parameter",
            EngineError::ParameterParse { .. }
            | EngineError::InvalidCardParameters { .. }
            | EngineError::StructuralValidation { .. }
            | EngineError::ExecutionValidation { .. }
            | EngineError::Validation { .. }
            | EngineError::NoFieldsProvided => "validation_error",
            EngineError::Retrieval { .. } => "retrieval_error",
            EngineError::Creation { .. } => "creation_error",
            EngineError::Update { .. } => "update_error",
            EngineError::UnavailableCapability { .. } => "unavailable_capability",
            EngineError::ResponseTooLarge { .. } => "response_too_large",
            EngineError::Internal { .. } => "internal_error",
        }
    }

    /// Caller-facing text without the code prefix
    pub fn message(&self) -> String {
        let full = self.to_string();
        match full.split_once("] ") {
            Some((_, rest)) => rest.to_string(),
            None => full,
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidQueryType { value } => EngineError::InvalidParameter {
                message: format!(
                    "Invalid query type: {}. Must be one of: native, query",
                    value
                ),
                request_info: None,
            },
            CoreError::InvalidCardType { value } => EngineError::InvalidParameter {
                message: format!(
                    "Invalid card type: {}. Must be one of: question, model, metric",
                    value
                ),
                request_info: None,
            },
            CoreError::QueryShapeMismatch { message } => EngineError::InvalidParameter {
                message,
                request_info: None,
            },
            CoreError::ParameterParse { message } => EngineError::ParameterParse {
                message: format!("Invalid JSON in parameters: {}", message),
            },
            other => EngineError::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
