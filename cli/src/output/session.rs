//! `SessionPrinter` — Presentation-layer implementation of `SessionEvents`.

use owo_colors::OwoColorize as _;

use crate::application::ports::SessionEvents;
use crate::domain::{CommandOutput, RelayHop};
use crate::output::{OutputContext, json};

/// Prints relay instructions and command results, as lines or as one JSON
/// object per event.
pub struct SessionPrinter<'a> {
    ctx: &'a OutputContext,
    json: bool,
}

impl<'a> SessionPrinter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext, json: bool) -> Self {
        Self { ctx, json }
    }

    fn emit(&self, value: &serde_json::Value) {
        if let Err(e) = json::print(value) {
            tracing::warn!("cannot print session event: {e:#}");
        }
    }
}

impl SessionEvents for SessionPrinter<'_> {
    fn relay_ready(&self, hop: &RelayHop) {
        if self.json {
            self.emit(&serde_json::json!({ "relay": hop }));
            return;
        }
        self.ctx.success(&format!(
            "Key copied to {}:{}",
            hop.host, hop.remote_key_path
        ));
        self.ctx
            .header(&format!("To reach {} run inside the session:", hop.relay_host));
        self.ctx.kv("   ", &hop.hop_command);
    }

    /// Command results are never suppressed by `--quiet`.
    fn command_finished(&self, output: &CommandOutput) {
        if self.json {
            self.emit(&serde_json::json!({ "command_output": output }));
            return;
        }
        println!("{} {}", "Standard Output:".style(self.ctx.styles.dim), output.stdout);
        println!("{} {}", "Standard Error:".style(self.ctx.styles.dim), output.stderr);
    }
}
