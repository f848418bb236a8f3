//! Core engine — the login → poll → select → claim loop.

pub mod selector;
pub mod orchestrator;

pub use orchestrator::{ClaimOrchestrator, PollDecision};
