//! `hopbox outputs` — show the Terraform outputs this tool understands.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::infra::tfstate::read_state;
use crate::output::json;

/// Arguments for the outputs command.
#[derive(Args)]
pub struct OutputsArgs {
    /// Terraform state file [default: ssh.state_file]
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,
}

/// Run `hopbox outputs`.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn run(app: &AppContext, args: OutputsArgs) -> Result<()> {
    let path = args
        .state
        .unwrap_or_else(|| PathBuf::from(&app.config.ssh.state_file));
    let reading = read_state(&path);

    if app.is_json() {
        return json::print(&serde_json::json!({
            "state_file": path,
            "outputs": reading.outputs,
            "warning": reading.error.as_ref().map(ToString::to_string),
        }));
    }

    if let Some(err) = &reading.error {
        app.output.warn(&err.to_string());
    }
    app.renderer().render_outputs(&reading.outputs, &path);
    Ok(())
}
