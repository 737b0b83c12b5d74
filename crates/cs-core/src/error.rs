//! Error types for cs-core

use thiserror::Error;

/// Core error type for Cardsmith
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Query type outside the supported set
    #[error("[E003] Invalid query type: {value}. Must be one of: native, query")]
    InvalidQueryType { value: String },

    /// E004: Card type outside the supported set
    #[error("[E004] Invalid card type: {value}. Must be one of: question, model, metric")]
    InvalidCardType { value: String },

    /// E005: Query payload does not match its declared query type
    #[error("[E005] {message}")]
    QueryShapeMismatch { message: String },

    /// E006: Serialized parameter list could not be parsed
    #[error("[E006] Invalid JSON in parameters: {message}")]
    ParameterParse { message: String },

    /// E007: IO error with file path context
    #[error("[E007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E008: Config YAML parse error
    #[error("[E008] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
