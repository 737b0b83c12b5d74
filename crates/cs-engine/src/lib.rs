//! cs-engine - Card validation and parameter reconciliation for Cardsmith
//!
//! [`CardService`] runs the create, update and get operations against a
//! [`cs_api::CardApi`]. Create and update validate the query definition
//! (declared type, payload shape, MBQL structure, then execution for SQL),
//! the visualization settings and the parameters before anything is
//! persisted. Parameter quoting mistakes and placeholder mismatches are
//! reported as warnings on the success envelope.

pub mod analysis;
pub mod capability;
pub mod envelope;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod reconcile;
pub mod request;
pub mod service;
pub mod shape;

pub use analysis::{analyze, Analysis};
pub use envelope::{CardSaved, Envelope};
pub use error::{EngineError, EngineResult};
pub use request::{CreateCardRequest, GetCardRequest, UpdateCardRequest};
pub use service::CardService;
pub use shape::{shape_card, CardDefinition};
