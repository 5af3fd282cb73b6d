//! Command implementations

pub mod config;
pub mod connect;
pub mod fetch_key;
pub mod outputs;
pub mod provision;
pub mod session;
pub mod version;
