//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod connection;
pub mod error;
pub mod instance;
pub mod network;
pub mod tfstate;

pub use config::{HopboxConfig, validate_config_key, validate_config_value};
pub use connection::{CommandOutput, ConnectionInfo, RelayHop, SessionTarget};
pub use error::{
    ConfigError, ConnectionError, NetworkError, ProvisionError, SessionError, StateError,
};
pub use instance::{InstanceHandle, InstanceState, LaunchSpec};
pub use network::{NetworkContext, Subnet, Vpc, derive_subnet_cidr};
pub use tfstate::StateOutputs;
