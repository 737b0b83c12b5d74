//! Check command implementation
//!
//! Runs the local validation stages only; nothing is sent to the platform.

use crate::cli::{CheckArgs, GlobalArgs};
use crate::commands::common::{self, ExitCode};
use anyhow::{Context, Result};
use cs_core::{Capabilities, Config};
use cs_engine::analyze;

/// Execute the check command
pub(crate) async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let query = common::read_query(Some(args.query_type), &args.source)?
        .context("--query or --query-file is required")?;
    let capabilities = match &global.config {
        Some(path) => {
            Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
                .capabilities
        }
        None => Capabilities::default(),
    };

    let result = analyze(
        args.query_type.as_str(),
        query,
        common::parameter_input(args.parameters.as_deref()),
        &capabilities,
    );
    match result {
        Ok(analysis) => {
            common::print_json(&serde_json::to_value(&analysis)?);
            Ok(())
        }
        Err(err) => {
            common::print_json(&err.to_envelope());
            Err(ExitCode(1).into())
        }
    }
}
