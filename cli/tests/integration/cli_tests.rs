//! Integration tests for CLI structure and argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn hopbox() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hopbox"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    hopbox().assert().code(2).stderr(predicate::str::contains(
        "Provision a VM on AWS and open an SSH session on it",
    ));
}

#[test]
fn test_cli_help_lists_every_command() {
    let assert = hopbox().arg("--help").assert().success();
    let out = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    for cmd in ["provision", "connect", "outputs", "fetch-key", "config", "version"] {
        assert!(out.contains(cmd), "help is missing `{cmd}`:\n{out}");
    }
}

#[test]
fn test_cli_version_flag_shows_version() {
    hopbox()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hopbox"));
}

#[test]
fn test_version_command_shows_version() {
    hopbox()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "hopbox ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    for value in ["1", "yes", ""] {
        Command::new(assert_cmd::cargo::cargo_bin!("hopbox"))
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("hopbox "));
    }
}

#[test]
fn test_no_color_flag_is_accepted_by_subcommands() {
    hopbox()
        .args(["config", "show", "--no-color"])
        .env("HOPBOX_CONFIG", "/nonexistent/hopbox/config.yaml")
        .assert()
        .success();
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let assert = hopbox().args(["version", "--json"]).assert().success();
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

// --- Argument validation ---

#[test]
fn test_unknown_command_is_usage_error() {
    hopbox().arg("teleport").assert().code(2);
}

#[test]
fn test_connect_strategy_must_be_lib_or_system() {
    hopbox()
        .args(["connect", "--strategy", "telnet"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("telnet"));
}

#[test]
fn test_connect_command_conflicts_with_interactive() {
    hopbox()
        .args(["connect", "--command", "uptime", "--interactive"])
        .assert()
        .code(2);
}

#[test]
fn test_connect_relay_host_conflicts_with_no_relay() {
    hopbox()
        .args(["connect", "--relay-host", "10.0.1.5", "--no-relay"])
        .assert()
        .code(2);
}

#[test]
fn test_provision_wait_timeout_must_be_positive() {
    hopbox()
        .args(["provision", "--wait-timeout", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_fetch_key_requires_key_name() {
    hopbox()
        .arg("fetch-key")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--key-name"));
}

#[test]
fn test_provision_help_shows_no_connect() {
    hopbox()
        .args(["provision", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-connect"))
        .stdout(predicate::str::contains("--strategy"));
}
