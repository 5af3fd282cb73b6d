//! Terraform state output extraction.
//!
//! Pure parsing of an already-loaded state document. File access lives in
//! `crate::infra::tfstate`.

use serde::{Deserialize, Serialize};

pub const OUTPUT_PUBLIC_IP: &str = "instance_public_ip";
pub const OUTPUT_KEY_PATH: &str = "private_key_path";
pub const OUTPUT_USER: &str = "instance_user";
pub const OUTPUT_PRIVATE_IP: &str = "private_instance_ip";

/// Output names this tool understands. Everything else is ignored.
pub const RECOGNIZED_OUTPUTS: &[&str] = &[
    OUTPUT_PUBLIC_IP,
    OUTPUT_KEY_PATH,
    OUTPUT_USER,
    OUTPUT_PRIVATE_IP,
];

/// Recognised outputs of a state document. Absent and empty values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateOutputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_public_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_instance_ip: Option<String>,
}

impl StateOutputs {
    /// Look up a recognised output by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            OUTPUT_PUBLIC_IP => self.instance_public_ip.as_deref(),
            OUTPUT_KEY_PATH => self.private_key_path.as_deref(),
            OUTPUT_USER => self.instance_user.as_deref(),
            OUTPUT_PRIVATE_IP => self.private_instance_ip.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        RECOGNIZED_OUTPUTS.iter().all(|name| self.get(name).is_none())
    }
}

#[derive(Deserialize)]
struct StateDocument {
    #[serde(default)]
    outputs: std::collections::HashMap<String, OutputValue>,
}

#[derive(Deserialize)]
struct OutputValue {
    #[serde(default)]
    value: serde_json::Value,
}

/// Extract the recognised outputs from a state document.
///
/// Only string values are taken; other JSON types resolve to `None`.
///
/// # Errors
///
/// Returns an error if `content` is not a JSON object of the expected shape.
pub fn parse_outputs(content: &str) -> Result<StateOutputs, serde_json::Error> {
    let doc: StateDocument = serde_json::from_str(content)?;
    let take = |name: &str| {
        doc.outputs
            .get(name)
            .and_then(|o| o.value.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    };
    Ok(StateOutputs {
        instance_public_ip: take(OUTPUT_PUBLIC_IP),
        private_key_path: take(OUTPUT_KEY_PATH),
        instance_user: take(OUTPUT_USER),
        private_instance_ip: take(OUTPUT_PRIVATE_IP),
    })
}
