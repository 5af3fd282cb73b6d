//! Instance domain types: launch parameters and observed state.

use chrono::{DateTime, Utc};

/// Instance lifecycle state as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    Pending,
    Running,
    Other(String),
}

impl InstanceState {
    /// Map a provider state name (`pending`, `running`, `stopping`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "pending" => Self::Pending,
            "running" => Self::Running,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Other(name) => name,
        }
    }
}

/// Latest known view of a launched instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHandle {
    pub instance_id: String,
    pub state: InstanceState,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub launch_time: Option<DateTime<Utc>>,
}

impl InstanceHandle {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == InstanceState::Running
    }
}

/// Launch parameters for a single instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub ami: String,
    pub instance_type: String,
    pub key_name: String,
    pub subnet_id: String,
    pub security_group_id: String,
    pub device_name: String,
    pub volume_size_gib: u32,
    pub volume_type: String,
}
