//! Provisioning use-case: key pair, network, instance, wait, public IP.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Every step is a precondition for the next; the first failure aborts
//! the run and is returned to the caller.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{
    CloudProvider, InstanceControl, KeyFileStore, KeyPairs, NetworkInventory, ProgressReporter,
};
use crate::domain::config::{InstanceConfig, SecurityGroupConfig};
use crate::domain::{
    InstanceHandle, LaunchSpec, NetworkContext, ProvisionError, Subnet, Vpc, derive_subnet_cidr,
};

/// Inputs for a provisioning run, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub key_name: String,
    pub vpc_tag: String,
    pub security_group: SecurityGroupConfig,
    pub instance: InstanceConfig,
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub key_path: PathBuf,
    pub network: NetworkContext,
    pub instance: InstanceHandle,
}

/// Create a key pair and persist its private key as `<name>.pem` (mode 0400).
///
/// # Errors
///
/// Returns an error if the key file already exists, the provider call fails,
/// or the file cannot be written.
pub async fn create_key_pair(
    cloud: &impl KeyPairs,
    keys: &impl KeyFileStore,
    name: &str,
) -> Result<PathBuf> {
    let path = keys.key_path(name);
    if keys.exists(&path) {
        return Err(ProvisionError::KeyFileExists(path).into());
    }
    let material = cloud
        .create_key_pair(name)
        .await
        .context("Error in creating key pair")?;
    keys.write_private_key(&path, &material)?;
    drop(material);
    tracing::info!(key = %path.display(), "key pair created");
    Ok(path)
}

/// Look up the VPC tagged `Name=<tag>`.
///
/// # Errors
///
/// Returns `ProvisionError::VpcNotFound` when no VPC carries the tag.
pub async fn find_vpc_by_tag(cloud: &impl NetworkInventory, tag: &str) -> Result<Vpc> {
    let vpcs = cloud
        .find_vpcs_by_tag(tag)
        .await
        .context("Error in retrieving the VPC")?;
    if vpcs.len() > 1 {
        tracing::warn!(tag, count = vpcs.len(), "several VPCs share the tag; using the first");
    }
    vpcs.into_iter()
        .next()
        .ok_or_else(|| ProvisionError::VpcNotFound(tag.to_string()).into())
}

/// Reuse the group matching `sg.lookup_name`, or create one named `sg.name`.
///
/// # Errors
///
/// Returns an error if the lookup or creation call fails.
pub async fn get_or_create_security_group(
    cloud: &impl NetworkInventory,
    sg: &SecurityGroupConfig,
    vpc_id: &str,
) -> Result<String> {
    if sg.lookup_name != sg.name {
        tracing::warn!(
            lookup = %sg.lookup_name,
            create = %sg.name,
            "security group lookup and creation names differ; a created group will not be reused"
        );
    }
    let existing = cloud
        .find_security_groups(&sg.lookup_name)
        .await
        .context("Error in fetching security group")?;
    if let Some(id) = existing.into_iter().next() {
        tracing::info!(group = %id, "reusing security group");
        return Ok(id);
    }
    cloud
        .create_security_group(&sg.name, &sg.description, vpc_id)
        .await
        .context("Error in creating security group")
}

/// Reuse the first subnet of the VPC, or create one with `cidr` and enable
/// public IP auto-assignment on it.
///
/// A reused subnet is returned whatever its CIDR; a mismatch is reported.
///
/// # Errors
///
/// Returns an error if listing, creation, or the attribute change fails.
pub async fn get_or_create_subnet(
    cloud: &impl NetworkInventory,
    cidr: &str,
    vpc_id: &str,
    reporter: &impl ProgressReporter,
) -> Result<Subnet> {
    let existing = cloud
        .list_subnets(vpc_id)
        .await
        .context("Error in fetching subnets")?;
    if let Some(subnet) = existing.into_iter().next() {
        if subnet.cidr_block != cidr {
            tracing::warn!(
                subnet = %subnet.id,
                existing = %subnet.cidr_block,
                derived = %cidr,
                "reusing subnet with a different CIDR"
            );
            reporter.warn(&format!(
                "reusing subnet {} ({}) instead of {cidr}",
                subnet.id, subnet.cidr_block
            ));
        }
        return Ok(subnet);
    }

    let subnet = cloud
        .create_subnet(cidr, vpc_id)
        .await
        .context("Error in creating subnet")?;
    cloud
        .enable_public_ip_on_launch(&subnet.id)
        .await
        .context("Error in enabling public IP assignment on subnet")?;
    Ok(subnet)
}

/// Launch exactly one instance.
///
/// # Errors
///
/// Returns an error if the provider call fails.
pub async fn launch_instance(cloud: &impl InstanceControl, spec: &LaunchSpec) -> Result<InstanceHandle> {
    let handle = cloud
        .run_instance(spec)
        .await
        .context("Error in launching instance")?;
    tracing::info!(instance = %handle.instance_id, "instance launched");
    Ok(handle)
}

/// Poll every `interval` until the instance reports `running`.
///
/// Returns right after the first describe that reports `running`.
///
/// # Errors
///
/// Returns `ProvisionError::WaitTimedOut` once `timeout` has elapsed without
/// reaching `running`, or any error from the describe call.
pub async fn wait_until_running(
    cloud: &impl InstanceControl,
    instance_id: &str,
    interval: Duration,
    timeout: Duration,
    reporter: &impl ProgressReporter,
) -> Result<InstanceHandle> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let current = cloud
            .describe_instance(instance_id)
            .await
            .context("Error in refreshing instance state")?;
        if current.is_running() {
            return Ok(current);
        }
        tracing::debug!(instance = instance_id, state = current.state.name(), "waiting");
        if tokio::time::Instant::now() >= deadline {
            return Err(ProvisionError::WaitTimedOut {
                instance_id: instance_id.to_string(),
                last_state: current.state.name().to_string(),
                timeout,
            }
            .into());
        }
        reporter.step("Waiting for instance to be running...");
        tokio::time::sleep(interval).await;
    }
}

/// Refresh the instance once and return its public IP, if one is assigned yet.
///
/// # Errors
///
/// Returns an error if the describe call fails.
pub async fn resolve_public_ip(
    cloud: &impl InstanceControl,
    instance_id: &str,
) -> Result<(InstanceHandle, Option<String>)> {
    let handle = cloud
        .describe_instance(instance_id)
        .await
        .context("Error in resolving public IP")?;
    let ip = handle.public_ip.clone();
    Ok((handle, ip))
}

/// Run the whole provisioning sequence.
///
/// # Errors
///
/// Returns the first error from any step.
pub async fn provision(
    cloud: &impl CloudProvider,
    keys: &impl KeyFileStore,
    request: &ProvisionRequest,
    reporter: &impl ProgressReporter,
) -> Result<ProvisionOutcome> {
    let key_path = create_key_pair(cloud, keys, &request.key_name).await?;
    reporter.success(&format!("Key pair created and saved to {}", key_path.display()));

    let vpc = find_vpc_by_tag(cloud, &request.vpc_tag).await?;
    reporter.success(&format!("VPC {} with CIDR {}", vpc.id, vpc.cidr_block));

    let cidr = derive_subnet_cidr(&vpc.cidr_block)?;
    reporter.step(&format!("using CIDR block {cidr} for subnet"));

    let security_group_id =
        get_or_create_security_group(cloud, &request.security_group, &vpc.id).await?;
    reporter.success(&format!("Security group {security_group_id}"));

    let subnet = get_or_create_subnet(cloud, &cidr, &vpc.id, reporter).await?;
    reporter.success(&format!("Subnet {}", subnet.id));

    let spec = LaunchSpec {
        ami: request.instance.ami.clone(),
        instance_type: request.instance.instance_type.clone(),
        key_name: request.key_name.clone(),
        subnet_id: subnet.id.clone(),
        security_group_id: security_group_id.clone(),
        device_name: request.instance.device_name.clone(),
        volume_size_gib: request.instance.volume_size_gib,
        volume_type: request.instance.volume_type.clone(),
    };
    reporter.step(&format!("launching {} from {}", spec.instance_type, spec.ami));
    let launched = launch_instance(cloud, &spec).await?;
    reporter.success(&format!("Instance {} created", launched.instance_id));

    wait_until_running(
        cloud,
        &launched.instance_id,
        request.instance.poll_interval(),
        request.instance.wait_timeout(),
        reporter,
    )
    .await?;
    reporter.success("Instance is running");

    let (instance, public_ip) = resolve_public_ip(cloud, &launched.instance_id).await?;
    match &public_ip {
        Some(ip) => reporter.success(&format!("Public IP: {ip}")),
        None => reporter.warn("instance has no public IP yet"),
    }

    Ok(ProvisionOutcome {
        key_path,
        network: NetworkContext {
            vpc_id: vpc.id,
            vpc_cidr_block: vpc.cidr_block,
            subnet_id: subnet.id,
            subnet_cidr_block: subnet.cidr_block,
            security_group_id,
        },
        instance,
    })
}

/// Fetch the stored private key of an existing key pair and write it to
/// `path` (mode 0400).
///
/// # Errors
///
/// Returns an error if `path` already exists, the key cannot be fetched,
/// or the file cannot be written.
pub async fn fetch_key_pair(
    cloud: &impl KeyPairs,
    keys: &impl KeyFileStore,
    name: &str,
    path: &std::path::Path,
) -> Result<()> {
    if keys.exists(path) {
        return Err(ProvisionError::KeyFileExists(path.to_path_buf()).into());
    }
    let material = cloud
        .fetch_private_key(name)
        .await
        .with_context(|| format!("Error in fetching private key of '{name}'"))?;
    keys.write_private_key(path, &material)?;
    tracing::info!(key = %path.display(), "private key fetched");
    Ok(())
}
