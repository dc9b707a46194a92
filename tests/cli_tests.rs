use std::{fs, path::PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::tempdir;

fn demo_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/planbench.json")
}

#[test]
fn test_cli_exits_with_success_on_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planbench"));
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_cli_runs_demo_config() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planbench"));
    cmd.args(["--config", demo_config().to_str().unwrap(), "--trials", "2", "--no-color"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("albums_by_singer_country"));
    assert!(text.contains("releases_per_decade"));
    assert!(text.contains("(scanned)"));
    assert!(text.lines().any(|line| line.starts_with("latest: ")));
}

#[test]
fn test_cli_json_output() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planbench"));
    cmd.args([
        demo_config().to_str().unwrap(),
        "--trials",
        "1",
        "--format",
        "json",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();
    let reports: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["samples"].as_array().unwrap().len(), 3);
    assert_eq!(reports[1]["diffs"].as_array().unwrap().len(), 1);
}

#[test]
fn test_cli_missing_config_exits_with_usage_error() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planbench"));
    cmd.args(["--config", dir.path().join("nope.json").to_str().unwrap()]);
    cmd.assert().code(2);
}

#[test]
fn test_cli_unknown_optimizer_exits_with_usage_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.json");
    fs::write(
        &path,
        r#"{ "queries": [{ "name": "q", "sql": "SELECT 1", "optimizers": ["v7"] }] }"#,
    )
    .unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planbench"));
    cmd.args(["--config", path.to_str().unwrap()]);
    cmd.assert().code(2);
}

#[test]
fn test_cli_failed_query_exits_with_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.json");
    fs::write(
        &path,
        r#"{ "queries": [{ "name": "q", "sql": "SELECT * FROM missing", "optimizers": ["latest"] }] }"#,
    )
    .unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planbench"));
    cmd.args([
        "--config",
        path.to_str().unwrap(),
        "--max-failures",
        "1",
        "--no-color",
    ]);
    let assert = cmd.assert().code(1);
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("q: FAILED"));
}

#[test]
fn test_cli_rejects_unknown_flag() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planbench"));
    cmd.arg("--bogus");
    cmd.assert().code(2);
}
