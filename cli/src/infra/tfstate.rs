//! Reads Terraform state documents from disk.
//!
//! A missing or unreadable document is never fatal: the reading carries
//! empty outputs plus the reason, and the caller decides what to do.

use std::path::Path;

use crate::domain::StateError;
use crate::domain::StateOutputs;
use crate::domain::tfstate::parse_outputs;

/// Result of reading a state document.
#[derive(Debug, Default)]
pub struct StateReading {
    pub outputs: StateOutputs,
    pub error: Option<StateError>,
}

/// Read the recognised outputs from the state document at `path`.
#[must_use]
pub fn read_state(path: &Path) -> StateReading {
    match load(path) {
        Ok(outputs) => {
            tracing::debug!(path = %path.display(), "state outputs loaded");
            StateReading {
                outputs,
                error: None,
            }
        }
        Err(error) => {
            tracing::error!(%error, "cannot load state outputs");
            StateReading {
                outputs: StateOutputs::default(),
                error: Some(error),
            }
        }
    }
}

fn load(path: &Path) -> Result<StateOutputs, StateError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StateError::NotFound(path.to_path_buf())
        } else {
            StateError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    })?;
    parse_outputs(&content).map_err(|e| StateError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
