//! Integration tests for `hopbox connect` preconditions.
//!
//! Every case here stops before any network or process is started.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hopbox(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hopbox"));
    cmd.env("NO_COLOR", "1")
        .env("HOPBOX_CONFIG", dir.path().join("config.yaml"))
        .current_dir(dir.path());
    cmd
}

fn write_state(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("terraform.tfstate");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_connect_without_state_names_missing_host() {
    let dir = TempDir::new().unwrap();

    hopbox(&dir)
        .arg("connect")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("instance_public_ip"));
}

#[test]
fn test_connect_missing_key_path_is_diagnosed() {
    let dir = TempDir::new().unwrap();
    let state = write_state(
        &dir,
        r#"{"outputs":{"instance_public_ip":{"value":"1.2.3.4"},"instance_user":{"value":"ubuntu"}}}"#,
    );

    hopbox(&dir)
        .args(["connect", "--state", &state])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("private_key_path"));
}

#[test]
fn test_connect_missing_user_even_with_flags_for_the_rest() {
    let dir = TempDir::new().unwrap();

    hopbox(&dir)
        .args(["connect", "--host", "1.2.3.4", "--key", "k.pem"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("instance_user"));
}

#[test]
fn test_connect_json_error_has_code() {
    let dir = TempDir::new().unwrap();

    let assert = hopbox(&dir).args(["connect", "--json"]).assert().code(1);
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "missing_connection_field");
    assert!(
        value["message"]
            .as_str()
            .unwrap()
            .contains("instance_public_ip")
    );
}

/// Puts `ssh` and `scp` stand-ins that exit 0 at the front of `PATH`.
#[cfg(unix)]
fn stub_ssh_tools(dir: &TempDir) -> String {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).unwrap();
    for tool in ["ssh", "scp"] {
        let path = bin.join(tool);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    format!(
        "{}:{}",
        bin.display(),
        std::env::var("PATH").unwrap_or_default()
    )
}

#[cfg(unix)]
#[test]
fn test_connect_json_relay_hop_is_a_json_object() {
    let dir = TempDir::new().unwrap();
    let path = stub_ssh_tools(&dir);
    std::fs::write(dir.path().join("deployer-key.pem"), "pem").unwrap();
    let state = write_state(
        &dir,
        r#"{"outputs":{
            "instance_public_ip":{"value":"1.2.3.4"},
            "private_instance_ip":{"value":"10.0.1.5"},
            "private_key_path":{"value":"deployer-key.pem"},
            "instance_user":{"value":"ubuntu"}}}"#,
    );

    let assert = hopbox(&dir)
        .env("PATH", path)
        .args(["--json", "connect", "--state", &state])
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)
        .expect("stdout is a single JSON object");

    assert_eq!(value["relay"]["host"], "1.2.3.4");
    assert_eq!(value["relay"]["relay_host"], "10.0.1.5");
    assert_eq!(
        value["relay"]["hop_command"],
        "ssh -i ~/.ssh/id_rsa ubuntu@10.0.1.5"
    );
}

#[cfg(unix)]
#[test]
fn test_connect_quiet_relay_hop_prints_nothing() {
    let dir = TempDir::new().unwrap();
    let path = stub_ssh_tools(&dir);
    std::fs::write(dir.path().join("deployer-key.pem"), "pem").unwrap();

    hopbox(&dir)
        .env("PATH", path)
        .args([
            "--quiet",
            "connect",
            "--host",
            "1.2.3.4",
            "--key",
            "deployer-key.pem",
            "--user",
            "ubuntu",
            "--relay-host",
            "10.0.1.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
