//! Behavior of the recording fake used by engine tests

use cs_api::testing::{ApiCall, RecordingApi};
use cs_api::{ApiError, CardApi, QueryExecution};
use serde_json::json;

#[tokio::test]
async fn test_fetch_records_call() {
    let api = RecordingApi::new().with_card(json!({"id": 7, "name": "Revenue"}));
    let card = api.fetch_card(7, Some(true)).await.unwrap();
    assert_eq!(card["name"], "Revenue");
    assert_eq!(
        api.calls(),
        vec![ApiCall::FetchCard {
            id: 7,
            ignore_view: Some(true)
        }]
    );
}

#[tokio::test]
async fn test_fetch_missing_card_is_404() {
    let api = RecordingApi::new();
    let err = api.fetch_card(1, None).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_update_merges_fields() {
    let api = RecordingApi::new().with_card(json!({"id": 3, "name": "Old", "display": "bar"}));
    let updated = api.update_card(3, &json!({"name": "New"})).await.unwrap();
    assert_eq!(updated, json!({"id": 3, "name": "New", "display": "bar"}));
    assert_eq!(api.last_update(), Some((3, json!({"name": "New"}))));
    assert!(api.persisted());
}

#[tokio::test]
async fn test_create_assigns_ids_after_seeded_cards() {
    let api = RecordingApi::new().with_card(json!({"id": 10}));
    let created = api.create_card(&json!({"name": "A"})).await.unwrap();
    assert_eq!(created["id"], 11);
    assert_eq!(api.card(11).unwrap()["name"], "A");
}

#[tokio::test]
async fn test_scripted_execution_and_failures() {
    let api = RecordingApi::new()
        .with_execution(QueryExecution::Failed {
            error: "Column \"X\" not found".to_string(),
        })
        .fail_create(ApiError::Transport("connection refused".to_string()));

    let execution = api.execute_native(1, "SELECT x").await.unwrap();
    assert_eq!(
        execution,
        QueryExecution::Failed {
            error: "Column \"X\" not found".to_string()
        }
    );
    assert_eq!(api.executed_sql(), vec!["SELECT x".to_string()]);

    let err = api.create_card(&json!({})).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
}
