//! Shared domain types for the camaudit workspace.
//!
//! Everything here is plain data: targets, credentials, the device record
//! produced by a successful probe, and the authorized scope of a scan.

pub mod config;
pub mod models;
pub mod network;
