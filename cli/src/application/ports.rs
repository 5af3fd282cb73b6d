//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{
    CommandOutput, HopboxConfig, InstanceHandle, LaunchSpec, RelayHop, SessionError,
    SessionTarget, Subnet, Vpc,
};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output, using the runner's default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Cloud Provider Ports ──────────────────────────────────────────────────────

/// Key pair operations.
#[allow(async_fn_in_trait)]
pub trait KeyPairs {
    /// Create a key pair and return its PEM private key material.
    async fn create_key_pair(&self, name: &str) -> Result<String>;
    /// Fetch the stored private key material of an existing key pair.
    async fn fetch_private_key(&self, name: &str) -> Result<String>;
}

/// VPC, subnet and security group lookups and creation.
#[allow(async_fn_in_trait)]
pub trait NetworkInventory {
    /// Find VPCs whose `Name` tag equals `tag`.
    async fn find_vpcs_by_tag(&self, tag: &str) -> Result<Vec<Vpc>>;
    /// Find security group ids whose group name equals `name`.
    async fn find_security_groups(&self, name: &str) -> Result<Vec<String>>;
    /// Create a security group in `vpc_id` and return its id.
    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        vpc_id: &str,
    ) -> Result<String>;
    /// List subnets belonging to `vpc_id`.
    async fn list_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>>;
    /// Create a subnet with `cidr` in `vpc_id`.
    async fn create_subnet(&self, cidr: &str, vpc_id: &str) -> Result<Subnet>;
    /// Turn on public IPv4 auto-assignment for instances launched in the subnet.
    async fn enable_public_ip_on_launch(&self, subnet_id: &str) -> Result<()>;
}

/// Instance launch and inspection.
#[allow(async_fn_in_trait)]
pub trait InstanceControl {
    /// Launch exactly one instance.
    async fn run_instance(&self, spec: &LaunchSpec) -> Result<InstanceHandle>;
    /// Fetch the current view of an instance.
    async fn describe_instance(&self, instance_id: &str) -> Result<InstanceHandle>;
}

/// Composite trait — any type implementing all three sub-traits is a `CloudProvider`.
pub trait CloudProvider: KeyPairs + NetworkInventory + InstanceControl {}

/// Blanket implementation: any type implementing all three sub-traits is a `CloudProvider`.
impl<T> CloudProvider for T where T: KeyPairs + NetworkInventory + InstanceControl {}

// ── Key File Port ─────────────────────────────────────────────────────────────

/// Persists private key material to the local filesystem.
pub trait KeyFileStore {
    /// Path the key named `name` is written to.
    fn key_path(&self, name: &str) -> PathBuf;
    /// Whether a file already exists at `path`.
    fn exists(&self, path: &Path) -> bool;
    /// Write `material` to a new file readable only by its owner (mode 0400).
    ///
    /// # Errors
    ///
    /// Returns an error if the file already exists or cannot be written.
    fn write_private_key(&self, path: &Path, material: &str) -> Result<()>;
}

// ── Remote Session Port ───────────────────────────────────────────────────────

/// An interactive or one-shot shell on a provisioned host.
///
/// Implementations never retry. Each failure kind maps to its own
/// `SessionError` variant.
#[allow(async_fn_in_trait)]
pub trait RemoteSession {
    /// Open the session against an already-validated target, handing
    /// anything meant for the user to `events`.
    async fn open(
        &self,
        target: &SessionTarget,
        events: &impl SessionEvents,
    ) -> Result<(), SessionError>;
}

/// Receives what a session produces for the user, so adapters never write
/// to stdout themselves. Sync trait.
pub trait SessionEvents {
    /// The key is on the host; the user can now hop to the relay.
    fn relay_ready(&self, hop: &RelayHop);
    /// A one-shot command finished.
    fn command_finished(&self, output: &CommandOutput);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load config, falling back to defaults when no file exists.
    fn load(&self) -> Result<HopboxConfig>;
    /// Persist config.
    fn save(&self, config: &HopboxConfig) -> Result<()>;
    /// Resolved path of the config file.
    fn path(&self) -> Result<PathBuf>;
}
