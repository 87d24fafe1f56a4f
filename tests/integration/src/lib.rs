//! Integration tests for the launchpad twins
//!
//! This test suite validates:
//! - A full mission flow on one node with live subscriptions
//! - Convergence of twins across nodes under out-of-order replication
//! - Registry enumeration and resolution over replicated logs

pub mod test_utils;

#[cfg(test)]
mod mission_flow_tests;

#[cfg(test)]
mod replication_tests;
