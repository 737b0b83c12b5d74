//! cs-validate - Structural validators for Cardsmith
//!
//! Pure functions reporting through [`cs_core::ValidationOutcome`]:
//! MBQL structural checks, visualization-settings checks against a display
//! mode, and the parameter processor that turns caller parameter records
//! into persisted parameters plus generated template tags.

pub mod mbql;
pub mod parameters;
pub mod visualization;

pub use mbql::validate_mbql_query;
pub use parameters::{process_parameters, slugify, ProcessedParameters};
pub use visualization::{validate_visualization_settings, DISPLAY_TYPES};
