//! cs-core - Core library for Cardsmith
//!
//! This crate provides the card data model shared by every Cardsmith
//! component: query definitions and template tags, parameter records and
//! the parameter normalizer, the remote card representation, the uniform
//! validation outcome, and `cardsmith.yml` configuration.

pub mod card;
pub mod config;
pub mod error;
pub mod parameter;
pub mod patch;
pub mod query;
pub(crate) mod serde_helpers;
pub mod validation;

pub use card::{Card, CardType, CollectionRef, Creator, ResultField};
pub use config::{Capabilities, Config, MetabaseConfig, ResponseConfig};
pub use error::{CoreError, CoreResult};
pub use parameter::{ParameterInput, ParameterRecord, RawParameter};
pub use patch::Patch;
pub use query::{DatasetQuery, NativeQuery, QueryDefinition, QueryType, TemplateTag, TemplateTags};
pub use validation::ValidationOutcome;
