//! Integration tests for `hopbox outputs`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hopbox(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hopbox"));
    cmd.env("NO_COLOR", "1")
        .env("HOPBOX_CONFIG", dir.path().join("config.yaml"));
    cmd
}

fn write_state(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("terraform.tfstate");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_outputs_prints_present_and_absent_values() {
    let dir = TempDir::new().unwrap();
    let state = write_state(&dir, r#"{"outputs":{"instance_public_ip":{"value":"1.2.3.4"}}}"#);

    hopbox(&dir)
        .args(["outputs", "--state", &state])
        .assert()
        .success()
        .stdout(predicate::str::contains("instance_public_ip"))
        .stdout(predicate::str::contains("1.2.3.4"))
        .stdout(predicate::str::contains("(absent)"));
}

#[test]
fn test_outputs_json_has_only_present_fields() {
    let dir = TempDir::new().unwrap();
    let state = write_state(
        &dir,
        r#"{"outputs":{"instance_public_ip":{"value":"1.2.3.4"},"instance_user":{"value":"ubuntu"}}}"#,
    );

    let assert = hopbox(&dir)
        .args(["outputs", "--json", "--state", &state])
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

    assert_eq!(value["outputs"]["instance_public_ip"], "1.2.3.4");
    assert_eq!(value["outputs"]["instance_user"], "ubuntu");
    assert!(value["outputs"].get("private_key_path").is_none());
    assert!(value["warning"].is_null());
}

#[test]
fn test_outputs_missing_state_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("nope.tfstate");

    hopbox(&dir)
        .args(["outputs", "--state"])
        .arg(&state)
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));
}
