use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const ORDERS: &str = r#"{"user": {"id": "U1", "orderHistory": [{"orderId": "O1"}, {"orderId": "O1"}]}}"#;

fn jsongraph(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jsongraph").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .env_remove("RUN_MODE");
    cmd
}

fn write_document(workdir: &TempDir, contents: &str) -> String {
    let path = workdir.path().join("doc.json");
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn test_build_prints_graph_json() {
    let workdir = TempDir::new().unwrap();
    let doc = write_document(&workdir, ORDERS);

    let output = jsongraph(&workdir)
        .args(["build", &doc, "--link", "orderId"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["metadata"]["cross_link_count"], "1");
    assert_eq!(graph["metadata"]["linked_fields"], "orderId");
    let labels: Vec<&str> = graph["edges"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|edge| edge["label"].as_str())
        .collect();
    assert!(labels.contains(&"same value: O1"));
}

#[test]
fn test_build_reads_stdin() {
    let workdir = TempDir::new().unwrap();
    jsongraph(&workdir)
        .args(["build", "-"])
        .write_stdin(r#"{"user": {"id": "U1", "age": 30}}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("USER.U1.age"));
}

#[test]
fn test_config_file_supplies_defaults() {
    let workdir = TempDir::new().unwrap();
    let doc = write_document(&workdir, ORDERS);
    let config = workdir.path().join("jsongraph.toml");
    fs::write(
        &config,
        "[build]\nlinked_fields = [\"orderId\"]\nseparate_array_nodes = true\n",
    )
    .unwrap();

    let output = jsongraph(&workdir)
        .args(["build", &doc, "--config", config.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["metadata"]["separate_array_nodes"], "true");
    assert_eq!(graph["metadata"]["cross_link_count"], "1");
}

#[test]
fn test_entities_lists_one_line_per_entity() {
    let workdir = TempDir::new().unwrap();
    let doc = write_document(&workdir, r#"{"orders": [{"orderId": "O1"}, {"orderId": "O2"}]}"#);

    jsongraph(&workdir)
        .args(["entities", &doc])
        .assert()
        .success()
        .stdout("ORDER.O1\t1\nORDER.O2\t1\n");
}

#[test]
fn test_malformed_document_fails_with_code() {
    let workdir = TempDir::new().unwrap();
    let doc = write_document(&workdir, "{\"user\": ");

    jsongraph(&workdir)
        .args(["build", &doc])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MALFORMED_INPUT"));
}

#[test]
fn test_depth_limit_is_enforced() {
    let workdir = TempDir::new().unwrap();
    let doc = write_document(&workdir, r#"{"a": {"b": {"c": {"d": {"e": 1}}}}}"#);

    jsongraph(&workdir)
        .args(["build", &doc, "--max-depth", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RESOURCE_EXHAUSTED"));
}

#[test]
fn test_missing_file_is_reported() {
    let workdir = TempDir::new().unwrap();
    jsongraph(&workdir)
        .args(["build", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_flag_switches_off_configured_array_mode() {
    let workdir = TempDir::new().unwrap();
    let doc = write_document(&workdir, ORDERS);
    let config = workdir.path().join("jsongraph.toml");
    fs::write(&config, "[build]\nseparate_array_nodes = true\n").unwrap();

    let output = jsongraph(&workdir)
        .args([
            "build",
            &doc,
            "--config",
            config.to_str().unwrap(),
            "--no-separate-array-nodes",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["metadata"]["separate_array_nodes"], "false");
}

#[test]
fn test_json_log_format_writes_structured_lines() {
    let workdir = TempDir::new().unwrap();
    let doc = write_document(&workdir, ORDERS);

    let output = jsongraph(&workdir)
        .args(["build", &doc, "--log-format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let line = stderr
        .lines()
        .find(|line| line.contains("graph built"))
        .unwrap();
    let event: Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["level"], "INFO");
    assert!(event["timestamp"].is_string());
}
