//! Integration tests for the credsmith CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! They never touch a real remote host: acquisition tests point the
//! channel at an unresolvable host and assert the failure contract.

mod acquire_command;
mod targets_command;
