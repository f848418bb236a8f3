//! CLAIMBOT — Textbroker order claimer
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod platforms;
pub mod engine;
pub mod storage;
pub mod notify;
