//! Connection details and the precondition for opening a session.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::error::ConnectionError;
use crate::domain::tfstate::StateOutputs;

/// Everything needed to reach a provisioned host. Any field may be absent
/// until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub username: Option<String>,
}

/// A validated session target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTarget {
    pub host: String,
    pub username: String,
    pub key_path: PathBuf,
    /// Private address of a second host to hop to through `host`.
    pub relay_host: Option<String>,
}

/// Key copied onto the session host so the user can continue to a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayHop {
    pub host: String,
    pub relay_host: String,
    /// Where the key landed on `host`.
    pub remote_key_path: String,
    /// Command to run inside the session to reach `relay_host`.
    pub hop_command: String,
}

/// Result of a one-shot remote command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl ConnectionInfo {
    /// Build from Terraform state outputs.
    #[must_use]
    pub fn from_outputs(outputs: &StateOutputs) -> Self {
        Self {
            public_ip: outputs.instance_public_ip.clone(),
            private_ip: outputs.private_instance_ip.clone(),
            private_key_path: outputs.private_key_path.as_ref().map(PathBuf::from),
            username: outputs.instance_user.clone(),
        }
    }

    /// Overlay every field that is set in `other`.
    #[must_use]
    pub fn overridden_by(self, other: ConnectionInfo) -> Self {
        Self {
            public_ip: other.public_ip.or(self.public_ip),
            private_ip: other.private_ip.or(self.private_ip),
            private_key_path: other.private_key_path.or(self.private_key_path),
            username: other.username.or(self.username),
        }
    }

    /// Check that host, key path and username are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::MissingField` naming the first absent field.
    pub fn validate(&self) -> Result<SessionTarget, ConnectionError> {
        let host = non_empty(self.public_ip.as_deref()).ok_or(ConnectionError::MissingField(
            "public IP (instance_public_ip)",
        ))?;
        let key_path = self
            .private_key_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConnectionError::MissingField(
                "private key path (private_key_path)",
            ))?;
        let username = non_empty(self.username.as_deref())
            .ok_or(ConnectionError::MissingField("username (instance_user)"))?;

        Ok(SessionTarget {
            host: host.to_string(),
            username: username.to_string(),
            key_path: key_path.clone(),
            relay_host: non_empty(self.private_ip.as_deref()).map(String::from),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
