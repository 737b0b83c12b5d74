use super::*;
use serde_json::json;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

fn global(config: Option<PathBuf>, url: Option<&str>) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        config,
        url: url.map(str::to_string),
    }
}

fn write_config(dir: &TempDir, name: &str, url: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(
        &path,
        format!("metabase:\n  url: {}\nresponse:\n  max_size_bytes: 5000\n", url),
    )
    .unwrap();
    path
}

#[test]
#[serial]
fn test_config_from_directory() {
    std::env::remove_var(URL_ENV);
    let dir = TempDir::new().unwrap();
    write_config(&dir, "cardsmith.yml", "https://mb.example.com");

    let config = resolve_config(&global(None, None), dir.path()).unwrap();
    assert_eq!(config.metabase.url, "https://mb.example.com");
    assert_eq!(config.response.max_size_bytes, 5000);
}

#[test]
#[serial]
fn test_url_flag_overrides_config_file() {
    std::env::remove_var(URL_ENV);
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "other.yml", "https://mb.example.com");

    let config =
        resolve_config(&global(Some(path), Some("http://localhost:3000")), dir.path()).unwrap();
    assert_eq!(config.metabase.url, "http://localhost:3000");
    assert_eq!(config.response.max_size_bytes, 5000);
}

#[test]
#[serial]
fn test_url_flag_without_config_file() {
    std::env::remove_var(URL_ENV);
    let dir = TempDir::new().unwrap();
    let config = resolve_config(&global(None, Some("http://localhost:3000")), dir.path()).unwrap();
    assert_eq!(config.metabase.url, "http://localhost:3000");
    assert!(config.capabilities.card_parameters);
}

#[test]
#[serial]
fn test_missing_config_and_url_fails() {
    std::env::remove_var(URL_ENV);
    let dir = TempDir::new().unwrap();
    let err = resolve_config(&global(None, None), dir.path()).unwrap_err();
    assert!(err.to_string().contains("pass --config or --url"));
}

#[test]
#[serial]
fn test_invalid_url_flag_is_rejected() {
    std::env::remove_var(URL_ENV);
    let dir = TempDir::new().unwrap();
    assert!(resolve_config(&global(None, Some("mb.example.com")), dir.path()).is_err());
}

#[test]
fn test_read_native_query_is_text() {
    let source = QuerySource {
        query: Some("SELECT 1".to_string()),
        query_file: None,
    };
    assert_eq!(
        read_query(Some(QueryTypeArg::Native), &source).unwrap(),
        Some(json!("SELECT 1"))
    );
}

#[test]
fn test_read_mbql_query_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("query.json");
    std::fs::write(&path, r#"{"source-table": 5}"#).unwrap();
    let source = QuerySource {
        query: None,
        query_file: Some(path),
    };
    assert_eq!(
        read_query(Some(QueryTypeArg::Query), &source).unwrap(),
        Some(json!({"source-table": 5}))
    );
}

#[test]
fn test_read_mbql_query_rejects_non_json() {
    let source = QuerySource {
        query: Some("SELECT 1".to_string()),
        query_file: None,
    };
    assert!(read_query(Some(QueryTypeArg::Query), &source).is_err());
}

#[test]
fn test_read_untyped_query_falls_back_to_text() {
    let source = QuerySource {
        query: Some("SELECT 1".to_string()),
        query_file: None,
    };
    assert_eq!(read_query(None, &source).unwrap(), Some(json!("SELECT 1")));
    assert_eq!(read_query(None, &QuerySource::default()).unwrap(), None);
}

#[test]
fn test_parse_json_arg() {
    assert_eq!(
        parse_json_arg("visualization", Some(r#"{"graph.dimensions": ["x"]}"#)).unwrap(),
        Some(json!({"graph.dimensions": ["x"]}))
    );
    assert_eq!(parse_json_arg("visualization", None).unwrap(), None);
    let err = parse_json_arg("visualization", Some("{")).unwrap_err();
    assert_eq!(err.to_string(), "--visualization is not valid JSON");
}

#[test]
fn test_patch_from_flags() {
    assert_eq!(patch(Some(3), false), Patch::Set(3));
    assert_eq!(patch::<i64>(None, true), Patch::Clear);
    assert_eq!(patch::<i64>(None, false), Patch::Unchanged);
}
