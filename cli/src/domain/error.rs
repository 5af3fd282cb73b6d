//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. The top-level handler in `main.rs` downcasts them
//! to pick a machine-readable error code.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ── Network errors ────────────────────────────────────────────────────────────

/// Errors from CIDR parsing and subnet derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid CIDR block '{0}': expected a.b.c.d/prefix")]
    InvalidCidr(String),

    #[error("CIDR block '{cidr}' has prefix /{prefix}; a /24 subnet cannot be carved from a prefix longer than /24")]
    PrefixTooLong { cidr: String, prefix: u8 },
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors that abort the provisioning pipeline.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("No VPC named '{0}' found.")]
    VpcNotFound(String),

    #[error("Key file {} already exists. Remove it or choose another key name.", .0.display())]
    KeyFileExists(PathBuf),

    #[error("The provider returned no instance for the launch request.")]
    NoInstanceLaunched,

    #[error("Instance {0} not found.")]
    InstanceNotFound(String),

    #[error("Instance {instance_id} did not reach 'running' within {}s (last state: {last_state}).", .timeout.as_secs())]
    WaitTimedOut {
        instance_id: String,
        last_state: String,
        timeout: Duration,
    },

    #[error("Provisioning cancelled.")]
    Cancelled,

    #[error("Provisioning aborted by user.")]
    Declined,
}

// ── Connection errors ─────────────────────────────────────────────────────────

/// Errors raised before any connection attempt is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Missing {0}: cannot connect without it. Pass it as a flag or add it to the state outputs.")]
    MissingField(&'static str),
}

// ── State document errors ─────────────────────────────────────────────────────

/// Problems reading a Terraform state document. Reported, never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("State file {} not found.", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot read state file {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("State file {} is not valid JSON: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

// ── Session errors ────────────────────────────────────────────────────────────

/// Errors from a remote shell session. Each variant has its own message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Authentication failed, please verify your credentials: {0}")]
    Authentication(String),

    #[error("SSH connection error: {0}")]
    Connection(String),

    #[error("Failed to run remote session: {0}")]
    Execution(String),

    #[error("Failed to copy key to the relay host: {0}")]
    Relay(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}
