//! CLI command implementations

pub(crate) mod check;
pub(crate) mod common;
pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod update;
