use super::*;
use serde_json::json;

#[test]
fn test_core_errors_map_to_invalid_parameter() {
    let err = EngineError::from(CoreError::InvalidQueryType {
        value: "sql".to_string(),
    });
    assert_eq!(err.error_type(), "invalid_parameter");
    assert_eq!(err.status_code(), 400);
    assert_eq!(
        err.message(),
        "Invalid query type: sql. Must be one of: native, query"
    );
}

#[test]
fn test_parameter_parse_message() {
    let err = EngineError::from(CoreError::ParameterParse {
        message: "expected value at line 1 column 1".to_string(),
    });
    assert_eq!(
        err,
        EngineError::ParameterParse {
            message: "Invalid JSON in parameters: expected value at line 1 column 1".to_string()
        }
    );
}

#[test]
fn test_remote_status_passes_through() {
    let api_err = ApiError::Http {
        status: 404,
        message: "Not found.".to_string(),
    };
    let err = EngineError::update(&api_err, json!({}));
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.error_type(), "update_error");

    let transport = ApiError::Transport("timed out".to_string());
    assert_eq!(EngineError::creation(&transport, json!({})).status_code(), 500);
}

#[test]
fn test_with_request_info_keeps_existing() {
    let err = EngineError::InvalidParameter {
        message: "bad".to_string(),
        request_info: Some(json!({"card_id": 1})),
    }
    .with_request_info(json!({"card_id": 2}));
    match err {
        EngineError::InvalidParameter { request_info, .. } => {
            assert_eq!(request_info, Some(json!({"card_id": 1})))
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_message_strips_code() {
    assert_eq!(
        EngineError::NoFieldsProvided.message(),
        "No fields provided for update"
    );
    assert_eq!(
        EngineError::NoFieldsProvided.to_string(),
        "[C012] No fields provided for update"
    );
}
