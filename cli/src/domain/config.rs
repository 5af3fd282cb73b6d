//! Domain types and validators for hopbox configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "aws.profile",
    "aws.region",
    "key_pair.name",
    "key_pair.dir",
    "network.vpc_tag",
    "security_group.lookup_name",
    "security_group.name",
    "security_group.description",
    "instance.ami",
    "instance.type",
    "instance.volume_size_gib",
    "instance.volume_type",
    "instance.device_name",
    "instance.poll_interval_secs",
    "instance.wait_timeout_secs",
    "ssh.username",
    "ssh.state_file",
    "ssh.relay_key_name",
    "ssh.exit_keyword",
];

pub const VALID_VOLUME_TYPES: &[&str] = &["gp2", "gp3", "io1", "io2", "st1", "sc1", "standard"];

/// Resource names and identifiers: no whitespace, no shell metacharacters.
#[allow(clippy::expect_used)]
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9./~][A-Za-z0-9._/~:+-]*$").expect("valid regex"));

#[allow(clippy::expect_used)]
static AMI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ami-[0-9a-f]{8,17}$").expect("valid regex"));

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.hopbox/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HopboxConfig {
    pub aws: AwsConfig,
    pub key_pair: KeyPairConfig,
    pub network: NetworkConfig,
    pub security_group: SecurityGroupConfig,
    pub instance: InstanceConfig,
    pub ssh: SshConfig,
}

/// Passed through to the `aws` CLI when set; otherwise ambient settings apply.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AwsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyPairConfig {
    pub name: String,
    /// Directory the generated `<name>.pem` is written to.
    pub dir: String,
}

impl Default for KeyPairConfig {
    fn default() -> Self {
        Self {
            name: "my-key-pair".to_string(),
            dir: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Value of the `Name` tag identifying the VPC.
    pub vpc_tag: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            vpc_tag: "project-vpc".to_string(),
        }
    }
}

/// Security group lookup and creation names are independent settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SecurityGroupConfig {
    /// Name matched by the `group-name` filter when looking for a group to reuse.
    pub lookup_name: String,
    /// Name given to a newly created group.
    pub name: String,
    pub description: String,
}

impl Default for SecurityGroupConfig {
    fn default() -> Self {
        Self {
            lookup_name: "project-sgn".to_string(),
            name: "MySecurityGroup".to_string(),
            description: "My security group".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstanceConfig {
    /// Ubuntu 20.04 LTS by default.
    pub ami: String,
    #[serde(rename = "type")]
    pub instance_type: String,
    pub volume_size_gib: u32,
    pub volume_type: String,
    pub device_name: String,
    pub poll_interval_secs: u64,
    pub wait_timeout_secs: u64,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            ami: "ami-042c0d1e87e056819".to_string(),
            instance_type: "t3.medium".to_string(),
            volume_size_gib: 30,
            volume_type: "gp2".to_string(),
            device_name: "/dev/xvda".to_string(),
            poll_interval_secs: 5,
            wait_timeout_secs: 600,
        }
    }
}

impl InstanceConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SshConfig {
    pub username: String,
    /// Terraform state document read by `hopbox connect` and `hopbox outputs`.
    pub state_file: String,
    /// File name the relayed key gets under `~/.ssh/` on the first host.
    pub relay_key_name: String,
    /// Line that ends an interactive library session.
    pub exit_keyword: String,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            username: "ubuntu".to_string(),
            state_file: "./terraform.tfstate".to_string(),
            relay_key_name: "id_rsa".to_string(),
            exit_keyword: "exit".to_string(),
        }
    }
}

impl HopboxConfig {
    /// Set `key` to `value` after validating both.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;

        let owned = value.to_string();
        match key {
            "aws.profile" => self.aws.profile = Some(owned),
            "aws.region" => self.aws.region = Some(owned),
            "key_pair.name" => self.key_pair.name = owned,
            "key_pair.dir" => self.key_pair.dir = owned,
            "network.vpc_tag" => self.network.vpc_tag = owned,
            "security_group.lookup_name" => self.security_group.lookup_name = owned,
            "security_group.name" => self.security_group.name = owned,
            "security_group.description" => self.security_group.description = owned,
            "instance.ami" => self.instance.ami = owned,
            "instance.type" => self.instance.instance_type = owned,
            "instance.volume_size_gib" => self.instance.volume_size_gib = value.parse()?,
            "instance.volume_type" => self.instance.volume_type = owned,
            "instance.device_name" => self.instance.device_name = owned,
            "instance.poll_interval_secs" => self.instance.poll_interval_secs = value.parse()?,
            "instance.wait_timeout_secs" => self.instance.wait_timeout_secs = value.parse()?,
            "ssh.username" => self.ssh.username = owned,
            "ssh.state_file" => self.ssh.state_file = owned,
            "ssh.relay_key_name" => self.ssh.relay_key_name = owned,
            "ssh.exit_keyword" => self.ssh.exit_keyword = owned,
            _ => unreachable!("key validated against VALID_CONFIG_KEYS"),
        }
        Ok(())
    }

    /// Every setting as `(key, display value)`, in `VALID_CONFIG_KEYS` order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let unset = || "(not set)".to_string();
        vec![
            ("aws.profile", self.aws.profile.clone().unwrap_or_else(unset)),
            ("aws.region", self.aws.region.clone().unwrap_or_else(unset)),
            ("key_pair.name", self.key_pair.name.clone()),
            ("key_pair.dir", self.key_pair.dir.clone()),
            ("network.vpc_tag", self.network.vpc_tag.clone()),
            ("security_group.lookup_name", self.security_group.lookup_name.clone()),
            ("security_group.name", self.security_group.name.clone()),
            ("security_group.description", self.security_group.description.clone()),
            ("instance.ami", self.instance.ami.clone()),
            ("instance.type", self.instance.instance_type.clone()),
            ("instance.volume_size_gib", self.instance.volume_size_gib.to_string()),
            ("instance.volume_type", self.instance.volume_type.clone()),
            ("instance.device_name", self.instance.device_name.clone()),
            ("instance.poll_interval_secs", self.instance.poll_interval_secs.to_string()),
            ("instance.wait_timeout_secs", self.instance.wait_timeout_secs.to_string()),
            ("ssh.username", self.ssh.username.clone()),
            ("ssh.state_file", self.ssh.state_file.clone()),
            ("ssh.relay_key_name", self.ssh.relay_key_name.clone()),
            ("ssh.exit_keyword", self.ssh.exit_keyword.clone()),
        ]
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |expected: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
        .into()
    };

    match key {
        "instance.volume_size_gib" => {
            if !value.parse::<u32>().is_ok_and(|n| n > 0) {
                return Err(invalid("Expected a positive whole number of GiB."));
            }
        }
        "instance.poll_interval_secs" | "instance.wait_timeout_secs" => {
            if !value.parse::<u64>().is_ok_and(|n| n > 0) {
                return Err(invalid("Expected a positive whole number of seconds."));
            }
        }
        "instance.volume_type" => {
            if !VALID_VOLUME_TYPES.contains(&value) {
                return Err(invalid(&format!(
                    "Valid values: {}",
                    VALID_VOLUME_TYPES.join(", ")
                )));
            }
        }
        "instance.ami" => {
            if !AMI_RE.is_match(value) {
                return Err(invalid("Expected an image id such as ami-042c0d1e87e056819."));
            }
        }
        "security_group.description" => {
            if value.trim().is_empty() {
                return Err(invalid("Expected a non-empty description."));
            }
        }
        _ => {
            if !NAME_RE.is_match(value) {
                return Err(invalid(
                    "Expected a non-empty value without whitespace or shell metacharacters.",
                ));
            }
        }
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
