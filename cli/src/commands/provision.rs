//! `hopbox provision` — create a key pair, network and instance, then connect.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::provision::{self, ProvisionOutcome, ProvisionRequest};
use crate::commands::session::{self, SessionArgs};
use crate::domain::{ConnectionInfo, HopboxConfig, ProvisionError, validate_config_value};
use crate::output::{TerminalReporter, json, progress};

/// Arguments for the provision command.
#[derive(Args)]
pub struct ProvisionArgs {
    /// Key pair name [default: key_pair.name]
    #[arg(long)]
    pub key_name: Option<String>,

    /// `Name` tag of the VPC to use [default: network.vpc_tag]
    #[arg(long)]
    pub vpc_tag: Option<String>,

    /// Machine image id [default: instance.ami]
    #[arg(long)]
    pub ami: Option<String>,

    /// Instance type [default: instance.type]
    #[arg(long)]
    pub instance_type: Option<String>,

    /// Seconds to wait for the instance to run [default: instance.wait_timeout_secs]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub wait_timeout: Option<u64>,

    /// Stop after provisioning instead of opening a session
    #[arg(long)]
    pub no_connect: bool,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Resolve the request from config, with flags taking precedence.
///
/// # Errors
///
/// Returns an error if a flag value is invalid.
pub fn build_request(config: &HopboxConfig, args: &ProvisionArgs) -> Result<ProvisionRequest> {
    let mut request = ProvisionRequest {
        key_name: config.key_pair.name.clone(),
        vpc_tag: config.network.vpc_tag.clone(),
        security_group: config.security_group.clone(),
        instance: config.instance.clone(),
    };
    if let Some(name) = &args.key_name {
        validate_config_value("key_pair.name", name)?;
        request.key_name.clone_from(name);
    }
    if let Some(tag) = &args.vpc_tag {
        validate_config_value("network.vpc_tag", tag)?;
        request.vpc_tag.clone_from(tag);
    }
    if let Some(ami) = &args.ami {
        validate_config_value("instance.ami", ami)?;
        request.instance.ami.clone_from(ami);
    }
    if let Some(instance_type) = &args.instance_type {
        validate_config_value("instance.type", instance_type)?;
        request.instance.instance_type.clone_from(instance_type);
    }
    if let Some(secs) = args.wait_timeout {
        request.instance.wait_timeout_secs = secs;
    }
    Ok(request)
}

/// Run `hopbox provision`.
///
/// Ctrl-C while provisioning cancels the run; resources created so far are
/// left in place.
///
/// # Errors
///
/// Returns the first provisioning error, `ProvisionError::Declined` or
/// `ProvisionError::Cancelled`, or a session error.
pub async fn run(app: &AppContext, args: ProvisionArgs) -> Result<()> {
    let request = build_request(&app.config, &args)?;

    let prompt = format!(
        "Launch a {} instance from {} in VPC '{}'? This creates billable resources",
        request.instance.instance_type, request.instance.ami, request.vpc_tag
    );
    if !app.confirm(&prompt, true)? {
        return Err(ProvisionError::Declined.into());
    }

    let cloud = app.cloud();
    let keys = app.key_store();
    let pb = app
        .output
        .show_progress()
        .then(|| progress::spinner("Provisioning..."));
    let reporter = match &pb {
        Some(pb) => TerminalReporter::new(&app.output).with_spinner(pb.clone()),
        None => TerminalReporter::new(&app.output),
    };

    let result = tokio::select! {
        result = provision::provision(&cloud, &keys, &request, &reporter) => result,
        _ = tokio::signal::ctrl_c() => Err(ProvisionError::Cancelled.into()),
    };
    if let Some(pb) = &pb {
        match &result {
            Ok(_) => progress::finish_ok(pb, "Provisioning complete"),
            Err(_) => progress::finish_error(pb, "Provisioning failed"),
        }
    }
    let outcome = result?;

    if app.is_json() {
        json::print(&outcome_json(&outcome))?;
    } else {
        app.renderer().render_provision(&outcome);
    }

    if args.no_connect {
        return Ok(());
    }
    let Some(public_ip) = outcome.instance.public_ip.clone() else {
        app.output
            .warn("Instance has no public IP; skipping the session");
        return Ok(());
    };

    let info = ConnectionInfo {
        public_ip: Some(public_ip),
        private_ip: None,
        private_key_path: Some(outcome.key_path),
        username: Some(app.config.ssh.username.clone()),
    };
    session::open(app, &args.session, &info).await
}

fn outcome_json(outcome: &ProvisionOutcome) -> serde_json::Value {
    let net = &outcome.network;
    let instance = &outcome.instance;
    serde_json::json!({
        "instance_id": instance.instance_id,
        "state": instance.state.name(),
        "public_ip": instance.public_ip,
        "private_ip": instance.private_ip,
        "launch_time": instance.launch_time,
        "key_path": outcome.key_path,
        "vpc_id": net.vpc_id,
        "vpc_cidr_block": net.vpc_cidr_block,
        "subnet_id": net.subnet_id,
        "subnet_cidr_block": net.subnet_cidr_block,
        "security_group_id": net.security_group_id,
    })
}
