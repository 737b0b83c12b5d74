//! Integration tests for the cs binary

use serde_json::Value;
use std::process::{Command, Output};
use tempfile::TempDir;

fn cs(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cs"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("CARDSMITH_URL")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_check_clean_native_query() {
    let dir = TempDir::new().unwrap();
    let output = cs(
        &dir,
        &[
            "check",
            "--query",
            "SELECT * FROM orders WHERE status = {{status}}",
            "--parameters",
            r#"[{"name": "Status", "type": "category"}]"#,
        ],
    );
    assert!(output.status.success());

    let body = stdout_json(&output);
    assert_eq!(body["success"], true);
    assert_eq!(body["parameters_count"], 1);
    assert_eq!(body["template-tags"]["status"]["type"], "text");
    assert!(body.get("sql_warnings").is_none());
}

#[test]
fn test_check_reports_quoted_parameter() {
    let dir = TempDir::new().unwrap();
    let output = cs(
        &dir,
        &[
            "check",
            "--query",
            "SELECT * FROM orders WHERE status = '{{status}}'",
            "--parameters",
            r#"[{"name": "Status", "type": "category"}]"#,
        ],
    );
    assert!(output.status.success());
    let body = stdout_json(&output);
    assert!(body["sql_warnings"][0]
        .as_str()
        .unwrap()
        .contains("Parameter 'status' is quoted"));
}

#[test]
fn test_check_without_parameters_reports_undeclared_reference() {
    let dir = TempDir::new().unwrap();
    let output = cs(
        &dir,
        &[
            "check",
            "--query",
            "SELECT * FROM orders WHERE status = {{status}}",
        ],
    );
    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["parameters_count"], 0);
    let warnings = body["sql_warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0]
        .as_str()
        .unwrap()
        .starts_with("PARAMETER CONSISTENCY: SQL references {{status}}"));
}

#[test]
fn test_check_invalid_mbql_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let output = cs(
        &dir,
        &["check", "-t", "query", "--query", r#"{"limit": 0}"#],
    );
    assert_eq!(output.status.code(), Some(1));
    let body = stdout_json(&output);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid MBQL query");
}

#[test]
fn test_check_malformed_parameters() {
    let dir = TempDir::new().unwrap();
    let output = cs(
        &dir,
        &["check", "--query", "SELECT 1", "--parameters", "{oops"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["error"], "Parameter parsing error");
}

#[test]
fn test_check_respects_disabled_capability() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("cardsmith.yml");
    std::fs::write(
        &config,
        "metabase:\n  url: http://localhost:3000\ncapabilities:\n  card_parameters: false\n",
    )
    .unwrap();
    let output = cs(
        &dir,
        &[
            "--config",
            config.to_str().unwrap(),
            "check",
            "--query",
            "SELECT {{a}}",
            "--parameters",
            r#"[{"name": "a", "type": "category"}]"#,
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["error_type"], "unavailable_capability");
}

#[test]
fn test_get_without_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = cs(&dir, &["get", "1"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pass --config or --url"), "stderr: {}", stderr);
}
