//! Offline query analysis
//!
//! Runs every local stage of the create pipeline (query type, payload shape,
//! MBQL structure, parameter processing, mistake and consistency checks)
//! without touching the remote API.

use crate::error::EngineResult;
use crate::pipeline;
use cs_core::{Capabilities, ParameterInput, QueryDefinition, TemplateTags};
use serde::Serialize;
use serde_json::Value;

/// Findings of an offline analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub success: bool,
    pub query_type: String,
    pub parameters_count: usize,
    #[serde(rename = "template-tags", skip_serializing_if = "TemplateTags::is_empty")]
    pub template_tags: TemplateTags,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sql_warnings: Vec<String>,
}

/// Analyze a query definition and its parameters
pub fn analyze(
    query_type: &str,
    query: Value,
    parameters: ParameterInput,
    capabilities: &Capabilities,
) -> EngineResult<Analysis> {
    let query_type = pipeline::check_query_type(query_type)?;
    let definition = pipeline::check_query(query_type, query, capabilities)?;
    let processed = pipeline::process(parameters, capabilities)?.unwrap_or_default();

    let sql_warnings = definition
        .sql()
        .map(|sql| pipeline::declared_warnings(sql, processed.slugs()))
        .unwrap_or_default();
    let template_tags = match definition {
        QueryDefinition::Native { .. } => processed.template_tags,
        QueryDefinition::Structured { .. } => TemplateTags::default(),
    };

    Ok(Analysis {
        success: true,
        query_type: query_type.as_str().to_string(),
        parameters_count: processed.parameters.len(),
        template_tags,
        sql_warnings,
    })
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
