use super::*;
use crate::cli::{QuerySource, QueryTypeArg};
use cs_core::{ParameterInput, Patch};
use serde_json::json;

fn args(id: i64) -> UpdateArgs {
    UpdateArgs {
        id,
        query_type: None,
        source: QuerySource::default(),
        name: None,
        description: None,
        clear_description: false,
        collection: None,
        clear_collection: false,
        archived: None,
        display: None,
        visualization: None,
        parameters: None,
    }
}

#[test]
fn test_id_only_request_is_empty() {
    let request = build_request(&args(4)).unwrap();
    assert_eq!(request, UpdateCardRequest::new(4));
}

#[test]
fn test_full_request() {
    let mut update = args(4);
    update.query_type = Some(QueryTypeArg::Native);
    update.source.query = Some("SELECT * FROM t WHERE a = {{a}}".to_string());
    update.clear_description = true;
    update.collection = Some(9);
    update.visualization = Some(r#"{"table.pivot": true}"#.to_string());
    update.parameters = Some("[]".to_string());

    let request = build_request(&update).unwrap();
    assert_eq!(request.query_type.as_deref(), Some("native"));
    assert_eq!(request.query, Some(json!("SELECT * FROM t WHERE a = {{a}}")));
    assert_eq!(request.description, Patch::Clear);
    assert_eq!(request.collection_id, Patch::Set(9));
    assert_eq!(request.visualization_settings, Some(json!({"table.pivot": true})));
    assert_eq!(request.parameters, ParameterInput::Serialized("[]".to_string()));
}

#[test]
fn test_invalid_visualization_json() {
    let mut update = args(4);
    update.visualization = Some("not json".to_string());
    assert!(build_request(&update).is_err());
}
