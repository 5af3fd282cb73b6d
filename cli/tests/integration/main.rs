//! Integration tests for the hopbox CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! None of them reach AWS or open a network connection.

mod cli_tests;
mod connect_command;
mod outputs_command;
