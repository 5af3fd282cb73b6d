//! Hopbox - provision a VM on AWS and open an SSH session on it

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;
use owo_colors::OwoColorize as _;
use tracing_subscriber::EnvFilter;

use hopbox::cli::Cli;
use hopbox::domain::{
    ConfigError, ConnectionError, NetworkError, ProvisionError, SessionError, StateError,
};
use hopbox::output::{OutputContext, json};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    let ctx = OutputContext::new(cli.no_color, cli.quiet);
    if let Err(e) = cli.run().await {
        let plain = || eprintln!("{} {e:#}", "Error:".style(ctx.styles.error));
        if json_mode {
            match json::format_error(&format!("{e:#}"), error_code(&e)) {
                Ok(out) => println!("{out}"),
                Err(_) => plain(),
            }
        } else {
            plain();
        }
        std::process::exit(1);
    }
}

/// Machine-readable code for the `--json` error object.
fn error_code(e: &anyhow::Error) -> &'static str {
    if let Some(err) = e.downcast_ref::<ProvisionError>() {
        return match err {
            ProvisionError::VpcNotFound(_) => "vpc_not_found",
            ProvisionError::KeyFileExists(_) => "key_file_exists",
            ProvisionError::NoInstanceLaunched => "no_instance_launched",
            ProvisionError::InstanceNotFound(_) => "instance_not_found",
            ProvisionError::WaitTimedOut { .. } => "wait_timed_out",
            ProvisionError::Cancelled => "cancelled",
            ProvisionError::Declined => "declined",
        };
    }
    if let Some(err) = e.downcast_ref::<SessionError>() {
        return match err {
            SessionError::Authentication(_) => "ssh_authentication_failed",
            SessionError::Connection(_) => "ssh_connection_failed",
            SessionError::Execution(_) => "ssh_execution_failed",
            SessionError::Relay(_) => "ssh_relay_failed",
        };
    }
    if e.downcast_ref::<ConnectionError>().is_some() {
        return "missing_connection_field";
    }
    if e.downcast_ref::<NetworkError>().is_some() {
        return "invalid_cidr";
    }
    if e.downcast_ref::<StateError>().is_some() {
        return "state_unreadable";
    }
    if let Some(err) = e.downcast_ref::<ConfigError>() {
        return match err {
            ConfigError::UnknownKey { .. } => "unknown_config_key",
            ConfigError::InvalidValue { .. } => "invalid_config_value",
        };
    }
    "error"
}
