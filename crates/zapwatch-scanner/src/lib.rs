//! ZapWatch Scanner - scan orchestration and console helpers
//!
//! The `zapwatch` binary in this crate wires configuration, the engine
//! client, the result store and the report renderers together.

pub mod console;
pub mod orchestrator;

pub use orchestrator::{Orchestrator, ScanOutcome, ScanSettings};
