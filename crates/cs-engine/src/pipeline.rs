//! Validation pipeline shared by create and update
//!
//! Query checks run in a fixed order: declared type, payload shape, MBQL
//! structure, then (native only) execution. Each step short-circuits on
//! failure so nothing later runs and nothing is persisted.

use crate::capability::{self, Capability};
use crate::error::{EngineError, EngineResult};
use cs_api::{CardApi, QueryExecution};
use cs_core::{
    CardType, Capabilities, ParameterInput, QueryDefinition, QueryType, ValidationOutcome,
};
use cs_sql::{check_consistency, detect_parameter_mistakes};
use cs_validate::{
    process_parameters, validate_mbql_query, validate_visualization_settings, ProcessedParameters,
};
use serde_json::Value;

const MBQL_HELP: &str =
    "Fix the clauses at the reported paths; a query needs a source-table or source-query";
const VISUALIZATION_HELP: &str =
    "Use setting keys valid for the chart type; card.*, column_settings and series_settings work for every display";

/// Declared query type
pub fn check_query_type(raw: &str) -> EngineResult<QueryType> {
    Ok(raw.parse::<QueryType>()?)
}

/// Payload shape against the declared type, then MBQL structure
pub fn check_query(
    query_type: QueryType,
    payload: Value,
    capabilities: &Capabilities,
) -> EngineResult<QueryDefinition> {
    let definition = QueryDefinition::from_payload(query_type, payload)?;
    if let QueryDefinition::Structured { tree } = &definition {
        capability::require(capabilities, Capability::Mbql)?;
        let outcome = validate_mbql_query(&Value::Object(tree.clone()));
        reject_invalid(outcome, "Invalid MBQL query", MBQL_HELP, None)?;
    }
    Ok(definition)
}

pub fn check_card_type(raw: &str) -> EngineResult<CardType> {
    Ok(raw.parse::<CardType>()?)
}

pub fn check_visualization(display: &str, settings: &Value) -> EngineResult<()> {
    let outcome = validate_visualization_settings(display, settings);
    reject_invalid(
        outcome,
        "Invalid visualization settings",
        VISUALIZATION_HELP,
        Some(display),
    )
}

fn reject_invalid(
    outcome: ValidationOutcome,
    error: &str,
    help: &str,
    chart_type: Option<&str>,
) -> EngineResult<()> {
    if outcome.is_valid() {
        return Ok(());
    }
    Err(EngineError::StructuralValidation {
        error: error.to_string(),
        errors: outcome.errors,
        help: help.to_string(),
        chart_type: chart_type.map(str::to_string),
    })
}

/// Normalize and process caller parameters.
///
/// `None` when parameters were not supplied. An explicitly empty list is
/// `Some` with no records and needs no capability.
pub fn process(
    input: ParameterInput,
    capabilities: &Capabilities,
) -> EngineResult<Option<ProcessedParameters>> {
    let Some(records) = input.normalize()? else {
        return Ok(None);
    };
    if records.is_empty() {
        return Ok(Some(ProcessedParameters::default()));
    }
    capability::require(capabilities, Capability::CardParameters)?;

    let processed = process_parameters(&records);
    if !processed.is_valid() {
        return Err(EngineError::InvalidCardParameters {
            errors: processed.errors,
            parameters_count: records.len(),
        });
    }
    log::debug!("Processed {} parameter(s)", processed.parameters.len());
    Ok(Some(processed))
}

/// Mistake and consistency warnings for freshly declared parameters
pub fn declared_warnings<'a>(sql: &str, slugs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let slugs: Vec<&str> = slugs.into_iter().collect();
    let mut warnings: Vec<String> = detect_parameter_mistakes(sql, slugs.iter().copied())
        .iter()
        .flat_map(|m| m.to_lines())
        .collect();
    warnings.extend(
        check_consistency(sql, slugs)
            .iter()
            .map(|issue| format!("PARAMETER CONSISTENCY: {}", issue)),
    );
    warnings
}

/// Consistency warnings for parameters carried over from the persisted card
pub fn preserved_warnings<'a>(sql: &str, slugs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    check_consistency(sql, slugs)
        .iter()
        .map(|issue| format!("PARAMETER CONSISTENCY (preserved): {}", issue))
        .collect()
}

/// Run the SQL remotely with no template tags.
///
/// Returns the column metadata on success. Failure carries the database's
/// own message plus any warnings collected so far.
pub async fn execute(
    api: &dyn CardApi,
    database: i64,
    sql: &str,
    sql_warnings: &[String],
) -> EngineResult<Vec<Value>> {
    let error = match api.execute_native(database, sql).await {
        Ok(QueryExecution::Completed { row_count, columns }) => {
            log::debug!(
                "SQL validated on database {} ({} rows, {} columns)",
                database,
                row_count,
                columns.len()
            );
            return Ok(columns);
        }
        Ok(QueryExecution::Failed { error }) => error,
        Err(err) => err.message(),
    };
    log::info!("SQL rejected by database {}: {}", database, error);
    Err(EngineError::ExecutionValidation {
        error,
        sql_warnings: sql_warnings.to_vec(),
    })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
