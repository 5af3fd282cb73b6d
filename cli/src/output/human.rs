//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::provision::ProvisionOutcome;
use crate::domain::HopboxConfig;
use crate::domain::StateOutputs;
use crate::domain::tfstate::RECOGNIZED_OUTPUTS;
use crate::infra::config::CONFIG_ENV;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the recognised state outputs, marking absent ones.
    pub fn render_outputs(&self, outputs: &StateOutputs, path: &Path) {
        self.ctx
            .header(&format!("Terraform outputs ({})", path.display()));
        for name in RECOGNIZED_OUTPUTS {
            let value = outputs.get(name).unwrap_or("(absent)");
            self.ctx.kv(&format!("{name:<20}"), value);
        }
    }

    /// Render what a provisioning run created.
    pub fn render_provision(&self, outcome: &ProvisionOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Provisioned:");
        let net = &outcome.network;
        let instance = &outcome.instance;
        self.ctx.kv(&format!("{:<16}", "instance"), &instance.instance_id);
        self.ctx.kv(&format!("{:<16}", "state"), instance.state.name());
        self.ctx.kv(
            &format!("{:<16}", "public ip"),
            instance.public_ip.as_deref().unwrap_or("(none)"),
        );
        self.ctx.kv(
            &format!("{:<16}", "private ip"),
            instance.private_ip.as_deref().unwrap_or("(none)"),
        );
        if let Some(launched) = instance.launch_time {
            self.ctx
                .kv(&format!("{:<16}", "launched"), &launched.to_rfc3339());
        }
        self.ctx.kv(
            &format!("{:<16}", "vpc"),
            &format!("{} ({})", net.vpc_id, net.vpc_cidr_block),
        );
        self.ctx.kv(
            &format!("{:<16}", "subnet"),
            &format!("{} ({})", net.subnet_id, net.subnet_cidr_block),
        );
        self.ctx
            .kv(&format!("{:<16}", "security group"), &net.security_group_id);
        self.ctx.kv(
            &format!("{:<16}", "key file"),
            &outcome.key_path.display().to_string(),
        );
    }

    /// Render the current configuration.
    pub fn render_config(&self, config: &HopboxConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        for (key, value) in config.entries() {
            println!("  {:<30} {value}", format!("{key}:"));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in [CONFIG_ENV, "AWS_PROFILE", "AWS_REGION", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}
