//! cs-api - Remote card API for Cardsmith
//!
//! This crate provides the [`CardApi`] trait consumed by the engine, the
//! [`MetabaseClient`] implementation over HTTP, and (behind the
//! `test-support` feature) a recording in-memory fake.

pub mod error;
pub mod http;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{ApiError, ApiResult};
pub use http::MetabaseClient;
pub use traits::{CardApi, QueryExecution};
