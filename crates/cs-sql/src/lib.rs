//! cs-sql - SQL template analysis for Cardsmith
//!
//! Native card queries reference parameters through `{{slug}}` placeholders,
//! optionally wrapped in `[[ ... ]]` blocks that drop out when the parameter
//! has no value. This crate scans that template syntax, flags common
//! quoting mistakes, and cross-checks placeholders against declared
//! parameter slugs. Nothing here talks to a database.

pub mod consistency;
pub mod mistakes;
pub mod template;

pub use consistency::{check_consistency, ConsistencyIssue};
pub use mistakes::{detect_parameter_mistakes, Mistake};
pub use template::{referenced_names, scan, Placeholder, PlaceholderKind, TemplateScan};
