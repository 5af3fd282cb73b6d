//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Provision a VM on AWS and open an SSH session on it
#[derive(Parser)]
#[command(
    name = "hopbox",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also honours `NO_COLOR`)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a key pair, network and instance, then connect
    Provision(commands::provision::ProvisionArgs),

    /// Open a session on the host from Terraform state
    Connect(commands::connect::ConnectArgs),

    /// Show recognised Terraform outputs
    Outputs(commands::outputs::OutputsArgs),

    /// Download the private key of an existing key pair
    FetchKey(commands::fetch_key::FetchKeyArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            command,
        } = self;

        if let Command::Version = command {
            commands::version::run(json);
            return Ok(());
        }

        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
        })?;

        match command {
            Command::Provision(args) => commands::provision::run(&app, args).await,
            Command::Connect(args) => commands::connect::run(&app, args).await,
            Command::Outputs(args) => commands::outputs::run(&app, args),
            Command::FetchKey(args) => commands::fetch_key::run(&app, args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => Ok(()),
        }
    }
}
