//! Infrastructure implementation of the cloud provider ports.
//!
//! `AwsCliProvider<R>` routes every call through the `aws` CLI with
//! `--output json` via a `CommandRunner`, and decodes the responses with
//! serde. Credentials, profile and region resolution stay with the CLI.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::ports::{CommandRunner, InstanceControl, KeyPairs, NetworkInventory};
use crate::domain::config::AwsConfig;
use crate::domain::{InstanceHandle, InstanceState, LaunchSpec, ProvisionError, Subnet, Vpc};
use crate::infra::command_runner::TokioCommandRunner;

/// SSM parameter prefix under which EC2 stores private keys of key pairs
/// created outside `create-key-pair` (console, CloudFormation).
const KEYPAIR_PARAMETER_PREFIX: &str = "/ec2/keypair/";

/// Cloud adapter over the `aws` CLI.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct AwsCliProvider<R: CommandRunner> {
    runner: R,
    global_args: Vec<String>,
}

impl<R: CommandRunner> AwsCliProvider<R> {
    /// Create a provider; `profile` and `region` are passed through when set.
    pub fn new(runner: R, aws: &AwsConfig) -> Self {
        let mut global_args = Vec::new();
        if let Some(profile) = &aws.profile {
            global_args.extend(["--profile".to_string(), profile.clone()]);
        }
        if let Some(region) = &aws.region {
            global_args.extend(["--region".to_string(), region.clone()]);
        }
        global_args.extend(["--output".to_string(), "json".to_string()]);
        Self {
            runner,
            global_args,
        }
    }

    async fn invoke(&self, args: &[&str]) -> Result<Vec<u8>> {
        let mut full: Vec<&str> = self.global_args.iter().map(String::as_str).collect();
        full.extend_from_slice(args);
        let op = args.iter().take(2).copied().collect::<Vec<_>>().join(" ");

        let output = self
            .runner
            .run("aws", &full)
            .await
            .with_context(|| format!("aws {op}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("aws {op} failed: {}", stderr.trim());
        }
        Ok(output.stdout)
    }

    async fn call<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let stdout = self.invoke(args).await?;
        serde_json::from_slice(&stdout).with_context(|| {
            format!(
                "invalid JSON from aws {}",
                args.iter().take(2).copied().collect::<Vec<_>>().join(" ")
            )
        })
    }
}

impl AwsCliProvider<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(aws: &AwsConfig) -> Self {
        Self::new(TokioCommandRunner::default(), aws)
    }
}

fn filter(name: &str, value: &str) -> String {
    serde_json::json!([{ "Name": name, "Values": [value] }]).to_string()
}

// ── Response shapes ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateKeyPairResponse {
    key_material: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeKeyPairsResponse {
    #[serde(default)]
    key_pairs: Vec<KeyPairEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KeyPairEntry {
    key_pair_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetParameterResponse {
    parameter: ParameterEntry,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParameterEntry {
    value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeVpcsResponse {
    #[serde(default)]
    vpcs: Vec<VpcEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VpcEntry {
    vpc_id: String,
    cidr_block: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSecurityGroupsResponse {
    #[serde(default)]
    security_groups: Vec<GroupEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupEntry {
    group_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSubnetsResponse {
    #[serde(default)]
    subnets: Vec<SubnetEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateSubnetResponse {
    subnet: SubnetEntry,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SubnetEntry {
    subnet_id: String,
    cidr_block: String,
}

impl From<SubnetEntry> for Subnet {
    fn from(s: SubnetEntry) -> Self {
        Self {
            id: s.subnet_id,
            cidr_block: s.cidr_block,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RunInstancesResponse {
    #[serde(default)]
    instances: Vec<InstanceEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesResponse {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<InstanceEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceEntry {
    instance_id: String,
    state: StateEntry,
    public_ip_address: Option<String>,
    private_ip_address: Option<String>,
    launch_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StateEntry {
    name: String,
}

impl From<InstanceEntry> for InstanceHandle {
    fn from(i: InstanceEntry) -> Self {
        Self {
            instance_id: i.instance_id,
            state: InstanceState::from_name(&i.state.name),
            public_ip: i.public_ip_address,
            private_ip: i.private_ip_address,
            launch_time: i.launch_time,
        }
    }
}

// ── Port implementations ─────────────────────────────────────────────────────

impl<R: CommandRunner> KeyPairs for AwsCliProvider<R> {
    async fn create_key_pair(&self, name: &str) -> Result<String> {
        let resp: CreateKeyPairResponse = self
            .call(&[
                "ec2",
                "create-key-pair",
                "--key-name",
                name,
                "--key-type",
                "rsa",
                "--key-format",
                "pem",
            ])
            .await?;
        Ok(resp.key_material)
    }

    async fn fetch_private_key(&self, name: &str) -> Result<String> {
        let pairs: DescribeKeyPairsResponse = self
            .call(&["ec2", "describe-key-pairs", "--key-names", name])
            .await?;
        let id = pairs
            .key_pairs
            .into_iter()
            .next()
            .map(|k| k.key_pair_id)
            .ok_or_else(|| anyhow::anyhow!("key pair '{name}' not found"))?;

        let parameter = format!("{KEYPAIR_PARAMETER_PREFIX}{id}");
        let resp: GetParameterResponse = self
            .call(&[
                "ssm",
                "get-parameter",
                "--name",
                &parameter,
                "--with-decryption",
            ])
            .await
            .with_context(|| format!("private key of '{name}' is not stored in {parameter}"))?;
        Ok(resp.parameter.value)
    }
}

impl<R: CommandRunner> NetworkInventory for AwsCliProvider<R> {
    async fn find_vpcs_by_tag(&self, tag: &str) -> Result<Vec<Vpc>> {
        let filters = filter("tag:Name", tag);
        let resp: DescribeVpcsResponse = self
            .call(&["ec2", "describe-vpcs", "--filters", &filters])
            .await?;
        Ok(resp
            .vpcs
            .into_iter()
            .map(|v| Vpc {
                id: v.vpc_id,
                cidr_block: v.cidr_block,
            })
            .collect())
    }

    async fn find_security_groups(&self, name: &str) -> Result<Vec<String>> {
        let filters = filter("group-name", name);
        let resp: DescribeSecurityGroupsResponse = self
            .call(&["ec2", "describe-security-groups", "--filters", &filters])
            .await?;
        Ok(resp.security_groups.into_iter().map(|g| g.group_id).collect())
    }

    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        vpc_id: &str,
    ) -> Result<String> {
        let resp: GroupEntry = self
            .call(&[
                "ec2",
                "create-security-group",
                "--group-name",
                name,
                "--description",
                description,
                "--vpc-id",
                vpc_id,
            ])
            .await?;
        Ok(resp.group_id)
    }

    async fn list_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>> {
        let filters = filter("vpc-id", vpc_id);
        let resp: DescribeSubnetsResponse = self
            .call(&["ec2", "describe-subnets", "--filters", &filters])
            .await?;
        Ok(resp.subnets.into_iter().map(Subnet::from).collect())
    }

    async fn create_subnet(&self, cidr: &str, vpc_id: &str) -> Result<Subnet> {
        let resp: CreateSubnetResponse = self
            .call(&[
                "ec2",
                "create-subnet",
                "--vpc-id",
                vpc_id,
                "--cidr-block",
                cidr,
            ])
            .await?;
        Ok(resp.subnet.into())
    }

    async fn enable_public_ip_on_launch(&self, subnet_id: &str) -> Result<()> {
        self.invoke(&[
            "ec2",
            "modify-subnet-attribute",
            "--subnet-id",
            subnet_id,
            "--map-public-ip-on-launch",
        ])
        .await?;
        Ok(())
    }
}

impl<R: CommandRunner> InstanceControl for AwsCliProvider<R> {
    async fn run_instance(&self, spec: &LaunchSpec) -> Result<InstanceHandle> {
        let block_devices = serde_json::json!([{
            "DeviceName": spec.device_name,
            "Ebs": { "VolumeSize": spec.volume_size_gib, "VolumeType": spec.volume_type },
        }])
        .to_string();
        let interfaces = serde_json::json!([{
            "SubnetId": spec.subnet_id,
            "DeviceIndex": 0,
            "AssociatePublicIpAddress": true,
            "Groups": [spec.security_group_id],
        }])
        .to_string();

        let resp: RunInstancesResponse = self
            .call(&[
                "ec2",
                "run-instances",
                "--image-id",
                &spec.ami,
                "--count",
                "1",
                "--instance-type",
                &spec.instance_type,
                "--key-name",
                &spec.key_name,
                "--block-device-mappings",
                &block_devices,
                "--monitoring",
                "Enabled=false",
                "--network-interfaces",
                &interfaces,
            ])
            .await?;
        resp.instances
            .into_iter()
            .next()
            .map(InstanceHandle::from)
            .ok_or_else(|| ProvisionError::NoInstanceLaunched.into())
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<InstanceHandle> {
        let resp: DescribeInstancesResponse = self
            .call(&["ec2", "describe-instances", "--instance-ids", instance_id])
            .await?;
        resp.reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .next()
            .map(InstanceHandle::from)
            .ok_or_else(|| ProvisionError::InstanceNotFound(instance_id.to_string()).into())
    }
}
