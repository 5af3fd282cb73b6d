//! `hopbox fetch-key` — download the private key of an existing key pair.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::KeyFileStore;
use crate::application::services::provision;
use crate::output::json;

/// Arguments for the fetch-key command.
#[derive(Args)]
pub struct FetchKeyArgs {
    /// Key pair name
    #[arg(long)]
    pub key_name: String,

    /// Destination file [default: <key_pair.dir>/<name>.pem]
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Run `hopbox fetch-key`.
///
/// # Errors
///
/// Returns an error if the destination exists or the key cannot be fetched.
pub async fn run(app: &AppContext, args: FetchKeyArgs) -> Result<()> {
    let keys = app.key_store();
    let path = args
        .output
        .unwrap_or_else(|| keys.key_path(&args.key_name));

    provision::fetch_key_pair(&app.cloud(), &keys, &args.key_name, &path).await?;

    if app.is_json() {
        return json::print(&serde_json::json!({
            "key_name": args.key_name,
            "key_path": path,
        }));
    }
    app.output
        .success(&format!("Private key saved to {}", path.display()));
    Ok(())
}
