//! End-to-end card operations against the recording API

use cs_api::testing::{ApiCall, RecordingApi};
use cs_api::{ApiError, QueryExecution};
use cs_core::{Capabilities, ParameterInput};
use cs_engine::{CardService, CreateCardRequest, Envelope, GetCardRequest, UpdateCardRequest};
use serde_json::{json, Value};
use std::sync::Arc;

fn service(api: &Arc<RecordingApi>) -> CardService {
    CardService::new(api.clone())
}

fn status_parameter() -> ParameterInput {
    ParameterInput::List(
        serde_json::from_value(json!([{"name": "Status", "slug": "status", "type": "category"}]))
            .unwrap(),
    )
}

fn native_create(sql: &str) -> CreateCardRequest {
    let mut request = CreateCardRequest::new(1, "native", json!(sql), "Orders by status");
    request.parameters = status_parameter();
    request
}

#[tokio::test]
async fn test_create_native_card_with_parameter() {
    let api = Arc::new(RecordingApi::new().with_execution(QueryExecution::Completed {
        row_count: 2,
        columns: vec![json!({"name": "ID", "base_type": "type/Integer"})],
    }));
    let envelope = service(&api)
        .create(native_create("SELECT * FROM orders WHERE status = {{status}}"))
        .await;

    assert_eq!(
        envelope.to_value(),
        json!({"success": true, "card_id": 1, "name": "Orders by status", "parameters_count": 1})
    );

    let payload = api.last_create().unwrap();
    assert_eq!(payload["type"], "question");
    assert_eq!(payload["display"], "table");
    assert_eq!(payload["visualization_settings"], json!({}));
    assert_eq!(payload["dataset_query"]["type"], "native");
    assert_eq!(payload["dataset_query"]["database"], 1);
    assert_eq!(
        payload["dataset_query"]["native"]["template-tags"]["status"]["type"],
        "text"
    );
    assert_eq!(
        payload["result_metadata"],
        json!([{"name": "ID", "base_type": "type/Integer"}])
    );
    // Validation runs the raw SQL
    assert_eq!(
        api.executed_sql(),
        vec!["SELECT * FROM orders WHERE status = {{status}}".to_string()]
    );
}

#[tokio::test]
async fn test_create_with_quoted_parameter_warns() {
    let api = Arc::new(RecordingApi::new());
    let envelope = service(&api)
        .create(native_create("SELECT * FROM orders WHERE status = '{{status}}'"))
        .await;

    let saved = envelope.saved().unwrap();
    assert!(saved.success);
    assert!(saved.sql_warnings[0].contains("Parameter 'status' is quoted"));
    assert_eq!(
        saved.help.as_deref(),
        Some("Card created successfully, but check SQL parameter usage warnings above.")
    );
}

#[tokio::test]
async fn test_create_invalid_mbql_never_persists() {
    let api = Arc::new(RecordingApi::new());
    let request = CreateCardRequest::new(
        1,
        "query",
        json!({"aggregation": [["count"]]}),
        "Order count",
    );
    let envelope = service(&api).create(request).await;

    let value = envelope.to_value();
    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "Invalid MBQL query");
    assert!(!value["validation_errors"].as_array().unwrap().is_empty());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_create_query_type_mismatch_fails_before_remote_calls() {
    let api = Arc::new(RecordingApi::new());
    let native_with_tree = CreateCardRequest::new(1, "native", json!({"source-table": 1}), "A");
    let query_with_sql = CreateCardRequest::new(1, "query", json!("SELECT 1"), "B");

    for request in [native_with_tree, query_with_sql] {
        let envelope = service(&api).create(request).await;
        assert_eq!(envelope.error().unwrap().error_type(), "invalid_parameter");
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_create_mbql_card_skips_execution() {
    let api = Arc::new(RecordingApi::new());
    let request = CreateCardRequest::new(
        2,
        "query",
        json!({"source-table": 10, "aggregation": [["count"]]}),
        "Count",
    );
    let envelope = service(&api).create(request).await;
    assert!(envelope.is_success());
    assert!(api.executed_sql().is_empty());

    let payload = api.last_create().unwrap();
    assert_eq!(
        payload["dataset_query"],
        json!({"type": "query", "database": 2, "query": {"source-table": 10, "aggregation": [["count"]]}})
    );
    assert!(payload.get("result_metadata").is_none());
}

#[tokio::test]
async fn test_create_execution_failure_carries_database_error_and_warnings() {
    let api = Arc::new(RecordingApi::new().with_execution(QueryExecution::Failed {
        error: "Column \"STATE\" not found".to_string(),
    }));
    let envelope = service(&api)
        .create(native_create("SELECT * FROM orders WHERE state = '{{status}}'"))
        .await;

    let value = envelope.to_value();
    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "Column \"STATE\" not found");
    assert!(!value["sql_warnings"].as_array().unwrap().is_empty());
    assert_eq!(
        value["help"],
        "Check your SQL parameter usage. Parameters substitute with proper formatting automatically."
    );
    assert!(!api.persisted());
}

#[tokio::test]
async fn test_create_invalid_card_type() {
    let api = Arc::new(RecordingApi::new());
    let mut request = CreateCardRequest::new(1, "native", json!("SELECT 1"), "A");
    request.card_type = "dashboard".to_string();
    let value = service(&api).create(request).await.to_value();
    assert_eq!(value["error_type"], "invalid_parameter");
    assert_eq!(value["request_info"], json!({"database_id": 1, "name": "A"}));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_create_serialized_parameters() {
    let api = Arc::new(RecordingApi::new());
    let mut request = CreateCardRequest::new(
        1,
        "native",
        json!("SELECT * FROM orders WHERE {{created}}"),
        "Orders",
    );
    request.parameters = ParameterInput::Serialized(
        r#"[{"name": "Created", "type": "date/range", "field_id": 12}]"#.to_string(),
    );
    let envelope = service(&api).create(request).await;
    assert_eq!(envelope.saved().unwrap().parameters_count, 1);

    let payload = api.last_create().unwrap();
    let tag = &payload["dataset_query"]["native"]["template-tags"]["created"];
    assert_eq!(tag["type"], "dimension");
    assert_eq!(tag["dimension"], json!(["field", 12, null]));
}

#[tokio::test]
async fn test_create_parameter_parse_error() {
    let api = Arc::new(RecordingApi::new());
    let mut request = CreateCardRequest::new(1, "native", json!("SELECT 1"), "A");
    request.parameters = ParameterInput::Serialized("{not json".to_string());
    let value = service(&api).create(request).await.to_value();
    assert_eq!(value["error"], "Parameter parsing error");
    assert!(value["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON in parameters:"));
}

#[tokio::test]
async fn test_create_parameters_capability_disabled() {
    let api = Arc::new(RecordingApi::new());
    let service = CardService::new(api.clone()).with_capabilities(Capabilities {
        card_parameters: false,
        mbql: true,
    });
    let envelope = service
        .create(native_create("SELECT * FROM orders WHERE status = {{status}}"))
        .await;
    assert_eq!(
        envelope.error().unwrap().error_type(),
        "unavailable_capability"
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_create_remote_failure_is_creation_error() {
    let api = Arc::new(RecordingApi::new().fail_create(ApiError::Http {
        status: 403,
        message: "You don't have permissions to do that.".to_string(),
    }));
    let value = service(&api)
        .create(CreateCardRequest::new(1, "native", json!("SELECT 1"), "A"))
        .await
        .to_value();
    assert_eq!(value["status_code"], 403);
    assert_eq!(value["error_type"], "creation_error");
    assert_eq!(
        value["request_info"],
        json!({"endpoint": "/api/card", "method": "POST"})
    );
}

fn persisted_native_card() -> Value {
    json!({
        "id": 7,
        "name": "Orders",
        "display": "bar",
        "dataset_query": {
            "type": "native",
            "database": 1,
            "native": {
                "query": "SELECT * FROM orders WHERE status = {{status}}",
                "template-tags": {"status": {"id": "p-1", "name": "status", "display-name": "Status", "type": "text"}}
            }
        },
        "parameters": [{"id": "p-1", "name": "Status", "slug": "status", "type": "category",
                        "target": ["variable", ["template-tag", "status"]]}]
    })
}

#[tokio::test]
async fn test_update_with_only_id_fails_without_write() {
    let api = Arc::new(RecordingApi::new().with_card(persisted_native_card()));
    let envelope = service(&api).update(UpdateCardRequest::new(7)).await;
    assert_eq!(
        envelope.to_value(),
        json!({"success": false, "error": "No fields provided for update"})
    );
    assert!(!api.persisted());
}

#[tokio::test]
async fn test_update_sql_preserves_parameters_verbatim() {
    let card = persisted_native_card();
    let api = Arc::new(RecordingApi::new().with_card(card.clone()));
    let mut request = UpdateCardRequest::new(7);
    request.query_type = Some("native".to_string());
    request.query = Some(json!(
        "SELECT id, status FROM orders WHERE status = {{status}}"
    ));

    let envelope = service(&api).update(request).await;
    assert_eq!(
        envelope.to_value(),
        json!({"success": true, "card_id": 7, "name": "Orders", "parameters_count": 1})
    );

    let (id, payload) = api.last_update().unwrap();
    assert_eq!(id, 7);
    assert_eq!(payload["parameters"], card["parameters"]);
    assert_eq!(
        payload["dataset_query"]["native"]["template-tags"],
        card["dataset_query"]["native"]["template-tags"]
    );
    assert_eq!(
        payload["dataset_query"]["native"]["query"],
        "SELECT id, status FROM orders WHERE status = {{status}}"
    );
}

#[tokio::test]
async fn test_update_warnings_attach_help() {
    let api = Arc::new(RecordingApi::new().with_card(persisted_native_card()));
    let mut request = UpdateCardRequest::new(7);
    request.query_type = Some("native".to_string());
    request.query = Some(json!("SELECT * FROM orders"));

    let saved = service(&api).update(request).await.saved().cloned().unwrap();
    assert_eq!(
        saved.sql_warnings,
        vec!["PARAMETER CONSISTENCY (preserved): Parameter 'status' is declared but not referenced in SQL (missing {{status}} in query)".to_string()]
    );
    assert_eq!(
        saved.help.as_deref(),
        Some("Card updated successfully, but check SQL parameter usage warnings above.")
    );
}

#[tokio::test]
async fn test_update_remote_failure() {
    let api = Arc::new(
        RecordingApi::new()
            .with_card(persisted_native_card())
            .fail_update(ApiError::Transport("connection reset".to_string())),
    );
    let mut request = UpdateCardRequest::new(7);
    request.archived = Some(true);
    let value = service(&api).update(request).await.to_value();
    assert_eq!(value["status_code"], 500);
    assert_eq!(value["error_type"], "update_error");
    assert_eq!(
        value["request_info"],
        json!({"endpoint": "/api/card/7", "method": "PUT"})
    );
}

#[tokio::test]
async fn test_get_native_card() {
    let api = Arc::new(RecordingApi::new().with_card(persisted_native_card()));
    let mut request = GetCardRequest::new(7);
    request.ignore_view = Some(true);
    let envelope = service(&api).get(request).await;

    let Envelope::Definition(doc) = &envelope else {
        panic!("expected definition, got {:?}", envelope);
    };
    assert_eq!(doc["id"], 7);
    assert_eq!(doc["dataset_query"]["type"], "native");
    assert!(doc.get("sql_translation").is_none());
    assert_eq!(
        api.calls(),
        vec![ApiCall::FetchCard {
            id: 7,
            ignore_view: Some(true)
        }]
    );
}

#[tokio::test]
async fn test_get_mbql_card_with_translation() {
    let api = Arc::new(
        RecordingApi::new()
            .with_card(json!({
                "id": 8,
                "query_type": "query",
                "dataset_query": {"type": "query", "database": 3, "query": {"source-table": 4}}
            }))
            .with_translation("SELECT * FROM PUBLIC.ORDERS"),
    );
    let value = service(&api).get(GetCardRequest::new(8)).await.to_value();
    assert_eq!(value["sql_translation"], "SELECT * FROM PUBLIC.ORDERS");
}

#[tokio::test]
async fn test_get_translation_failure_is_omitted() {
    let api = Arc::new(
        RecordingApi::new()
            .with_card(json!({
                "id": 8,
                "dataset_query": {"type": "query", "database": 3, "query": {"source-table": 4}}
            }))
            .fail_translate(ApiError::Http {
                status: 500,
                message: "boom".to_string(),
            }),
    );
    let envelope = service(&api).get(GetCardRequest::new(8)).await;
    assert!(envelope.is_success());
    assert!(envelope.to_value().get("sql_translation").is_none());
}

#[tokio::test]
async fn test_get_without_translation() {
    let api = Arc::new(
        RecordingApi::new()
            .with_card(json!({
                "id": 8,
                "dataset_query": {"type": "query", "database": 3, "query": {"source-table": 4}}
            }))
            .with_translation("SELECT 1"),
    );
    let mut request = GetCardRequest::new(8);
    request.translate_mbql = false;
    service(&api).get(request).await;
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn test_get_response_too_large() {
    let api = Arc::new(RecordingApi::new().with_card(persisted_native_card()));
    let envelope = CardService::new(api.clone())
        .with_max_response_bytes(64)
        .get(GetCardRequest::new(7))
        .await;
    let value = envelope.to_value();
    assert_eq!(value["error_type"], "response_too_large");
    assert_eq!(value["status_code"], 413);
}

#[tokio::test]
async fn test_get_missing_card() {
    let api = Arc::new(RecordingApi::new());
    let value = service(&api).get(GetCardRequest::new(99)).await.to_value();
    assert_eq!(
        value,
        json!({
            "success": false,
            "status_code": 404,
            "error_type": "retrieval_error",
            "error": "Not found.",
            "request_info": {"endpoint": "/api/card/99", "method": "GET", "params": {}}
        })
    );
}
