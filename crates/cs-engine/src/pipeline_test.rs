use super::*;
use cs_api::testing::RecordingApi;
use cs_api::ApiError;
use cs_core::RawParameter;
use serde_json::json;

fn records(value: Value) -> Vec<RawParameter> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_invalid_query_type() {
    let err = check_query_type("sql").unwrap_err();
    assert_eq!(err.error_type(), "invalid_parameter");
}

#[test]
fn test_shape_mismatch() {
    let caps = Capabilities::default();
    let err = check_query(QueryType::Native, json!({"source-table": 1}), &caps).unwrap_err();
    assert_eq!(
        err.message(),
        "For native query type, query must be a string (SQL)"
    );
    let err = check_query(QueryType::Query, json!("SELECT 1"), &caps).unwrap_err();
    assert_eq!(
        err.message(),
        "For MBQL query type, query must be an object (MBQL structure)"
    );
}

#[test]
fn test_mbql_errors_are_fatal() {
    let err = check_query(
        QueryType::Query,
        json!({"aggregation": [["count"]]}),
        &Capabilities::default(),
    )
    .unwrap_err();
    match err {
        EngineError::StructuralValidation { error, errors, .. } => {
            assert_eq!(error, "Invalid MBQL query");
            assert!(!errors.is_empty());
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_mbql_capability_disabled() {
    let caps = Capabilities {
        card_parameters: true,
        mbql: false,
    };
    let err = check_query(QueryType::Query, json!({"source-table": 1}), &caps).unwrap_err();
    assert_eq!(err.error_type(), "unavailable_capability");

    // Native queries never need the MBQL validator
    assert!(check_query(QueryType::Native, json!("SELECT 1"), &caps).is_ok());
}

#[test]
fn test_card_type() {
    assert!(check_card_type("model").is_ok());
    assert_eq!(
        check_card_type("dashboard").unwrap_err().message(),
        "Invalid card type: dashboard. Must be one of: question, model, metric"
    );
}

#[test]
fn test_visualization_failure_names_chart_type() {
    let err = check_visualization("pie", &json!({"graph.metrics": ["count"]})).unwrap_err();
    match err {
        EngineError::StructuralValidation { chart_type, .. } => {
            assert_eq!(chart_type.as_deref(), Some("pie"))
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_process_absent_and_empty() {
    let caps = Capabilities {
        card_parameters: false,
        mbql: true,
    };
    assert_eq!(process(ParameterInput::Absent, &caps).unwrap(), None);
    let empty = process(ParameterInput::List(Vec::new()), &caps).unwrap();
    assert_eq!(empty, Some(ProcessedParameters::default()));
}

#[test]
fn test_process_requires_capability() {
    let caps = Capabilities {
        card_parameters: false,
        mbql: true,
    };
    let input = ParameterInput::List(records(json!([{"name": "a", "type": "text"}])));
    assert_eq!(
        process(input, &caps).unwrap_err().error_type(),
        "unavailable_capability"
    );
}

#[test]
fn test_process_serialized_parse_error() {
    let err = process(
        ParameterInput::Serialized("[{".to_string()),
        &Capabilities::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::ParameterParse { .. }));
}

#[test]
fn test_process_invalid_records_counts_input() {
    let input = ParameterInput::List(records(json!([
        {"name": "a", "type": "text"},
        {"name": "b", "type": "bogus"}
    ])));
    match process(input, &Capabilities::default()).unwrap_err() {
        EngineError::InvalidCardParameters {
            errors,
            parameters_count,
        } => {
            assert_eq!(parameters_count, 2);
            assert_eq!(errors.len(), 1);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_declared_warnings() {
    let sql = "SELECT * FROM orders WHERE status = '{{status}}' AND {{region}}";
    let warnings = declared_warnings(sql, ["status"]);
    assert_eq!(warnings.len(), 4);
    assert!(warnings[0].starts_with("WARNING: Parameter 'status' is quoted"));
    assert!(warnings[3].starts_with("PARAMETER CONSISTENCY: SQL references {{region}}"));
}

#[test]
fn test_preserved_warnings_skip_mistakes() {
    let sql = "SELECT * FROM orders WHERE state = '{{state}}'";
    let warnings = preserved_warnings(sql, ["status"]);
    assert_eq!(warnings.len(), 2);
    assert!(warnings
        .iter()
        .all(|w| w.starts_with("PARAMETER CONSISTENCY (preserved): ")));
}

#[tokio::test]
async fn test_execute_success_returns_columns() {
    let api = RecordingApi::new().with_execution(QueryExecution::Completed {
        row_count: 1,
        columns: vec![json!({"name": "ID"})],
    });
    let columns = execute(&api, 1, "SELECT 1", &[]).await.unwrap();
    assert_eq!(columns, vec![json!({"name": "ID"})]);
    assert_eq!(api.executed_sql(), vec!["SELECT 1".to_string()]);
}

#[tokio::test]
async fn test_execute_prefers_database_error() {
    let api = RecordingApi::new().with_execution(QueryExecution::Failed {
        error: "Table \"ORDERZ\" not found".to_string(),
    });
    let warnings = vec!["WARNING: x".to_string()];
    let err = execute(&api, 1, "SELECT * FROM orderz", &warnings)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExecutionValidation {
            error: "Table \"ORDERZ\" not found".to_string(),
            sql_warnings: warnings,
        }
    );
}

#[tokio::test]
async fn test_execute_transport_failure() {
    let api = RecordingApi::new().fail_execute(ApiError::Transport("timed out".to_string()));
    let err = execute(&api, 1, "SELECT 1", &[]).await.unwrap_err();
    assert_eq!(err.message(), "Request failed: timed out");
}
