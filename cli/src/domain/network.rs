//! Network domain types and subnet CIDR derivation.
//!
//! Pure functions only — no I/O, no async.

use crate::domain::error::NetworkError;

/// Prefix length of every subnet carved out of a VPC.
pub const SUBNET_PREFIX: u8 = 24;

/// Network resources resolved for a single provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    pub vpc_id: String,
    pub vpc_cidr_block: String,
    pub subnet_id: String,
    pub subnet_cidr_block: String,
    pub security_group_id: String,
}

/// A VPC as returned by the provider lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpc {
    pub id: String,
    pub cidr_block: String,
}

/// A subnet as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub id: String,
    pub cidr_block: String,
}

/// A parsed IPv4 CIDR block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    pub octets: [u8; 4],
    pub prefix: u8,
}

impl Cidr {
    /// Parse `a.b.c.d/prefix`.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::InvalidCidr` when the address does not have
    /// four decimal octets or the prefix is missing or above 32. Signs and
    /// leading zeros are rejected.
    pub fn parse(cidr: &str) -> Result<Self, NetworkError> {
        let invalid = || NetworkError::InvalidCidr(cidr.to_string());

        let (addr, prefix) = cidr.trim().split_once('/').ok_or_else(invalid)?;
        let prefix = decimal(prefix).ok_or_else(invalid)?;
        if prefix > 32 {
            return Err(invalid());
        }

        let mut octets = [0u8; 4];
        let mut parts = addr.split('.');
        for slot in &mut octets {
            *slot = parts
                .next()
                .and_then(decimal)
                .ok_or_else(invalid)?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { octets, prefix })
    }
}

/// Plain decimal `u8`: digits only, no sign, no leading zero.
fn decimal(part: &str) -> Option<u8> {
    let digits_only = !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (part.len() > 1 && part.starts_with('0')) {
        return None;
    }
    part.parse().ok()
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d] = self.octets;
        write!(f, "{a}.{b}.{c}.{d}/{}", self.prefix)
    }
}

/// Derive the `/24` subnet block for a VPC CIDR.
///
/// Keeps the first three octets and zeroes the fourth:
/// `10.0.0.0/16` becomes `10.0.0.0/24`.
///
/// # Errors
///
/// Returns an error if `vpc_cidr` is malformed or its prefix is longer
/// than `/24`.
pub fn derive_subnet_cidr(vpc_cidr: &str) -> Result<String, NetworkError> {
    let cidr = Cidr::parse(vpc_cidr)?;
    if cidr.prefix > SUBNET_PREFIX {
        return Err(NetworkError::PrefixTooLong {
            cidr: vpc_cidr.to_string(),
            prefix: cidr.prefix,
        });
    }
    let [a, b, c, _] = cidr.octets;
    Ok(Cidr {
        octets: [a, b, c, 0],
        prefix: SUBNET_PREFIX,
    }
    .to_string())
}
