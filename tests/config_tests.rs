use std::{fs, time::Duration};

use planbench::{BenchConfig, BenchError, RetryPolicy, config::resolve_config_path};
use tempfile::tempdir;

const MINIMAL: &str = r#"{
    "queries": [{ "name": "scan", "sql": "SELECT 1", "optimizers": ["latest"] }]
}"#;

#[test]
fn test_minimal_config_uses_defaults() {
    let config = BenchConfig::from_json(MINIMAL).unwrap();
    assert_eq!(config.database, "memory");
    assert_eq!(config.trials, 10);
    assert_eq!(config.retry, RetryPolicy::default());
    assert!(config.setup.is_empty());
    assert!(config.optimizers.is_empty());
    assert_eq!(config.trial_timeout(), None);
    assert_eq!(config.queries[0].optimizers, vec!["latest".to_string()]);
}

#[test]
fn test_full_config_round_trips_fields() {
    let json = r#"{
        "database": "bench.db",
        "trials": 3,
        "setup": ["CREATE TABLE t(a)"],
        "retry": { "max_failures": null },
        "trial_timeout_ms": 250,
        "optimizers": { "2": { "automatic_index": "ON" } },
        "queries": [{ "name": "q", "sql": "SELECT a FROM t", "optimizers": ["1", "2"] }]
    }"#;
    let config = BenchConfig::from_json(json).unwrap();
    assert_eq!(config.database, "bench.db");
    assert_eq!(config.trials, 3);
    assert_eq!(config.retry.max_failures, None);
    assert_eq!(config.retry.initial_backoff_ms, 10);
    assert_eq!(config.trial_timeout(), Some(Duration::from_millis(250)));
    assert_eq!(
        config.optimizers["2"].get("automatic_index").map(String::as_str),
        Some("ON")
    );
}

#[test]
fn test_validation_rejects_incomplete_queries() {
    let cases = [
        r#"{ "queries": [] }"#,
        r#"{ "queries": [{ "name": "", "sql": "SELECT 1", "optimizers": ["1"] }] }"#,
        r#"{ "queries": [{ "name": "q", "sql": "  ", "optimizers": ["1"] }] }"#,
        r#"{ "queries": [{ "name": "q", "sql": "SELECT 1", "optimizers": [] }] }"#,
        r#"{ "queries": [{ "name": "q", "sql": "SELECT 1", "optimizers": [""] }] }"#,
    ];
    for case in cases {
        let err = BenchConfig::from_json(case).unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)), "{case}: {err:?}");
    }
}

#[test]
fn test_malformed_json_is_config_error() {
    let err = BenchConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, BenchError::ConfigError(_)));
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.json");
    fs::write(&path, MINIMAL).unwrap();
    let config = BenchConfig::load(&path).unwrap();
    assert_eq!(config.queries.len(), 1);

    let missing = BenchConfig::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(missing.to_string().contains("absent.json"));
}

#[test]
fn test_explicit_config_path_wins() {
    assert_eq!(
        resolve_config_path(Some("custom.json")),
        std::path::PathBuf::from("custom.json")
    );
}

#[test]
fn test_demo_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/planbench.json");
    let config = BenchConfig::load(&path).unwrap();
    assert_eq!(config.queries.len(), 2);
    assert!(config.optimizers.contains_key("2"));
}
