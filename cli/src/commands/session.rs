//! Session strategy selection shared by `provision` and `connect`.

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::app::AppContext;
use crate::application::services::session;
use crate::domain::ConnectionInfo;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::ssh_lib::{DEFAULT_COMMAND, LibSshSession, SessionMode};
use crate::infra::ssh_process::SystemSshSession;
use crate::output::SessionPrinter;

/// How the remote shell is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// In-process SSH client
    Lib,
    /// System `ssh`/`scp` binaries
    #[default]
    System,
}

/// Session flags.
#[derive(Args, Debug, Default)]
pub struct SessionArgs {
    /// Session strategy
    #[arg(long, value_enum, default_value_t = Strategy::System)]
    pub strategy: Strategy,

    /// Command to run with the lib strategy [default: whoami]
    #[arg(long, conflicts_with = "interactive")]
    pub command: Option<String>,

    /// Line-driven shell with the lib strategy
    #[arg(long)]
    pub interactive: bool,
}

impl SessionArgs {
    fn mode(&self) -> SessionMode {
        if self.interactive {
            SessionMode::Interactive
        } else {
            SessionMode::Command(
                self.command
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COMMAND.to_string()),
            )
        }
    }
}

/// Open a session on `info` with the strategy chosen in `args`.
///
/// # Errors
///
/// Returns an error if a required field is missing or the session fails.
pub async fn open(app: &AppContext, args: &SessionArgs, info: &ConnectionInfo) -> Result<()> {
    let printer = SessionPrinter::new(&app.output, app.is_json());
    match args.strategy {
        Strategy::Lib => {
            tracing::debug!(mode = ?args.mode(), "lib session");
            let strategy = LibSshSession::new(args.mode(), &app.config.ssh.exit_keyword);
            session::open(&strategy, info, &printer).await
        }
        Strategy::System => {
            if args.command.is_some() || args.interactive {
                app.output
                    .warn("--command and --interactive only apply to --strategy lib");
            }
            let strategy = SystemSshSession::new(
                TokioCommandRunner::default(),
                &app.config.ssh.relay_key_name,
            );
            session::open(&strategy, info, &printer).await
        }
    }
}
