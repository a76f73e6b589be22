//! ZapWatch Core - Foundation types and error handling
//!
//! This crate provides the types shared by every ZapWatch crate:
//! - `Scan`, `ScanType`, `ScanStatus`: one orchestrated scan run
//! - `Vulnerability`, `NewVulnerability`: findings reported by the engine
//! - `RiskLevel`, `RiskCounts`: engine risk buckets and per-scan tallies
//! - `ScanTarget`: validated target URL

pub mod error;
pub mod finding;
pub mod risk;
pub mod scan;
pub mod target;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use finding::{NewVulnerability, NewVulnerabilityBuilder, Vulnerability};
pub use risk::{RiskCounts, RiskLevel};
pub use scan::{Scan, ScanStatus, ScanType};
pub use target::{ScanTarget, DEFAULT_TARGET};
