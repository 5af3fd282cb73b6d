//! `hopbox connect` — open a session on the host described by Terraform state.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::commands::session::{self, SessionArgs};
use crate::domain::ConnectionInfo;
use crate::infra::tfstate::read_state;

/// Arguments for the connect command.
#[derive(Args)]
pub struct ConnectArgs {
    /// Terraform state file [default: ssh.state_file]
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Public IP, overrides `instance_public_ip`
    #[arg(long, value_name = "IP")]
    pub host: Option<String>,

    /// Private key file, overrides `private_key_path`
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Login user, overrides `instance_user`
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// Private host to hop to, overrides `private_instance_ip`
    #[arg(long, value_name = "IP", conflicts_with = "no_relay")]
    pub relay_host: Option<String>,

    /// Do not copy the key for a relay hop
    #[arg(long)]
    pub no_relay: bool,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Run `hopbox connect`.
///
/// State read failures are reported and leave every field absent; flags
/// still fill them in.
///
/// # Errors
///
/// Returns an error if a required field is missing or the session fails.
pub async fn run(app: &AppContext, args: ConnectArgs) -> Result<()> {
    let state_path = args
        .state
        .unwrap_or_else(|| PathBuf::from(&app.config.ssh.state_file));
    let reading = read_state(&state_path);
    if let Some(err) = &reading.error {
        app.output.warn(&err.to_string());
    }

    let flags = ConnectionInfo {
        public_ip: args.host,
        private_ip: args.relay_host,
        private_key_path: args.key,
        username: args.user,
    };
    let mut info = ConnectionInfo::from_outputs(&reading.outputs).overridden_by(flags);
    if args.no_relay {
        info.private_ip = None;
    }

    session::open(app, &args.session, &info).await
}
