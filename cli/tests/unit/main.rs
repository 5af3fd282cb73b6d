//! Unit tests for the hopbox CLI
//!
//! These tests use mocked ports and run fast without cloud or network access.

mod architecture;
mod config_store;
mod mocks;
mod ssh_lib;
