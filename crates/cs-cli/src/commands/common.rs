//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use cs_api::MetabaseClient;
use cs_core::config::URL_ENV;
use cs_core::{Config, CoreError, ParameterInput, Patch};
use cs_engine::{CardService, Envelope};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::cli::{GlobalArgs, QuerySource, QueryTypeArg};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; never shown to the user
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load configuration for commands that talk to the platform
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let dir = std::env::current_dir().context("Failed to read current directory")?;
    resolve_config(global, &dir)
}

/// `--config` first, then `cardsmith.yml` in `dir`, then a bare `--url`.
/// `--url` always overrides the configured URL.
pub(crate) fn resolve_config(global: &GlobalArgs, dir: &Path) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match Config::load_from_dir(dir) {
            Ok(config) => config,
            Err(CoreError::ConfigNotFound { .. })
                if global.url.is_some() || std::env::var(URL_ENV).is_ok() =>
            {
                let mut config = Config::with_url("");
                config.apply_env_overrides();
                config
            }
            Err(err) => {
                return Err(err).context("No usable cardsmith.yml (pass --config or --url)")
            }
        },
    };
    if let Some(url) = &global.url {
        config.metabase.url = url.clone();
    }
    config.validate().context("Invalid configuration")?;
    log::debug!("Using BI platform at {}", config.metabase.url);
    Ok(config)
}

/// Card service backed by the HTTP client
pub(crate) fn build_service(global: &GlobalArgs) -> Result<CardService> {
    let config = load_config(global)?;
    let client = MetabaseClient::from_config(&config).context("Failed to build HTTP client")?;
    Ok(CardService::from_config(Arc::new(client), &config))
}

/// Query payload from `--query` or `--query-file`.
///
/// Native queries are taken as SQL text. MBQL must be JSON. Without a
/// declared type the text is used as JSON when it parses and as SQL
/// otherwise, leaving the type check to the engine.
pub(crate) fn read_query(
    query_type: Option<QueryTypeArg>,
    source: &QuerySource,
) -> Result<Option<Value>> {
    let text = match (&source.query, &source.query_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {}", path.display()))?,
        (None, None) => return Ok(None),
    };
    let value = match query_type {
        Some(QueryTypeArg::Native) => Value::String(text),
        Some(QueryTypeArg::Query) => serde_json::from_str(&text)
            .context("MBQL queries must be given as a JSON object")?,
        None => serde_json::from_str(&text).unwrap_or(Value::String(text)),
    };
    Ok(Some(value))
}

/// Parse a JSON-valued flag
pub(crate) fn parse_json_arg(flag: &str, text: Option<&str>) -> Result<Option<Value>> {
    text.map(|t| serde_json::from_str(t).with_context(|| format!("--{} is not valid JSON", flag)))
        .transpose()
}

/// Parameters stay serialized; the engine reports parse errors in its envelope
pub(crate) fn parameter_input(text: Option<&str>) -> ParameterInput {
    match text {
        Some(text) => ParameterInput::Serialized(text.to_string()),
        None => ParameterInput::Absent,
    }
}

pub(crate) fn patch<T>(value: Option<T>, clear: bool) -> Patch<T> {
    if clear {
        Patch::Clear
    } else {
        Patch::from_option(value)
    }
}

/// Print pretty JSON to stdout
pub(crate) fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

/// Print the envelope and map failure to exit code 1
pub(crate) fn finish(envelope: &Envelope) -> Result<()> {
    println!("{}", envelope.render());
    if envelope.is_success() {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
