//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

fn dzctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dzctl"))
        .args(args)
        .env_remove("DEVZERO_URL")
        .env_remove("DEVZERO_TEAM_ID")
        .env_remove("DEVZERO_TOKEN")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path.to_string_lossy().into_owned()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = dzctl(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("DevZero fleet provider"), "Should show app name");
    for command in ["resources", "schema", "validate", "plan", "apply", "read", "import", "destroy"] {
        assert!(stdout.contains(command), "Should show {command} command");
    }
    assert!(stdout.contains("--team-id"), "Should show team id option");
    assert!(stdout.contains("--log-format"), "Should show log format option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = dzctl(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("dzctl"), "Should show binary name");
}

#[test]
fn test_apply_help() {
    let output = dzctl(&["apply", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--config"), "Should show config option");
    assert!(stdout.contains("--state"), "Should show state option");
    assert!(stdout.contains("--output"), "Should show output option");
}

#[test]
fn test_resources_lists_all_types() {
    let output = dzctl(&["resources", "--format", "json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_str(&stdout).expect("resources JSON");
    let types: Vec<_> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        types,
        vec![
            "devzero_cluster",
            "devzero_node_policy",
            "devzero_node_policy_target",
            "devzero_workload_policy",
            "devzero_workload_policy_target",
        ]
    );
}

#[test]
fn test_schema_json_marks_sensitive_token() {
    let output = dzctl(&["schema", "devzero_cluster", "--format", "json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_str(&stdout).expect("schema JSON");
    let token = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["path"] == "token")
        .expect("token row");
    assert!(token["flags"].as_str().unwrap().contains("sensitive"));
}

#[test]
fn test_schema_unknown_resource_fails() {
    let output = dzctl(&["schema", "devzero_bogus"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("unknown resource type: devzero_bogus"));
}

#[test]
fn test_validate_accepts_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "cluster.json", r#"{"name": "prod"}"#);

    let output = dzctl(&["validate", "devzero_cluster", "-c", &config]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_validate_reports_attribute_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "policy.json",
        r#"{"name": "p", "action_triggers": ["hourly"]}"#,
    );

    let output = dzctl(&["validate", "devzero_workload_policy", "-c", &config]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("action_triggers"), "Should name the attribute: {stderr}");
}

#[test]
fn test_plan_create_offline() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "cluster.json", r#"{"name": "prod"}"#);

    let output = dzctl(&["plan", "devzero_cluster", "-c", &config, "--format", "json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let change: serde_json::Value = serde_json::from_str(&stdout).expect("plan JSON");
    assert_eq!(change["action"], "create");
    assert_eq!(change["planned"]["name"], "prod");
    assert!(change["prior"].is_null());
}

#[test]
fn test_plan_against_state_detects_update() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "cluster.json", r#"{"name": "prod-eu"}"#);
    let state = write(
        dir.path(),
        "state.json",
        r#"{"id": "cluster-1", "name": "prod", "token": "tok"}"#,
    );

    let output = dzctl(&["plan", "devzero_cluster", "-c", &config, "-s", &state, "-f", "json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let change: serde_json::Value = serde_json::from_str(&stdout).expect("plan JSON");
    assert_eq!(change["action"], "update");
    assert_eq!(change["planned"]["id"], "cluster-1");
}

#[test]
fn test_plan_logs_dispatch_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "cluster.json", r#"{"name": "prod"}"#);

    let output = Command::new(env!("CARGO_BIN_EXE_dzctl"))
        .args(["--log-format", "json", "plan", "devzero_cluster", "-c", &config])
        .env("RUST_LOG", "debug")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "{stderr}");
    let event = stderr
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .find(|event| event["fields"]["message"] == "Planned change")
        .expect("plan event on stderr");
    assert_eq!(event["fields"]["resource"], "devzero_cluster");
    assert_eq!(event["fields"]["action"], "create");
}

#[test]
fn test_apply_without_credentials_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "cluster.json", r#"{"name": "prod"}"#);

    let output = dzctl(&["apply", "devzero_cluster", "-c", &config]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Missing Devzero Team ID"));
    assert!(stderr.contains("Missing Devzero API Token"));
}

#[test]
fn test_missing_config_file() {
    let output = dzctl(&["validate", "devzero_cluster", "-c", "/nonexistent/cluster.json"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to read"));
}

#[test]
fn test_invalid_command() {
    let output = dzctl(&["frobnicate"]);
    assert!(!output.status.success(), "Invalid command should fail");
}

#[test]
fn test_missing_argument() {
    let output = dzctl(&["import", "devzero_cluster"]);
    assert!(!output.status.success(), "Missing id should fail");
}
