//! ZapWatch Engine - control client for the external scanning engine
//!
//! This crate provides:
//! - `ScanEngine`: the control verbs the orchestrator needs from an engine
//! - `ZapClient`: an implementation over the ZAP JSON API
//! - `PollPolicy` / `poll_until`: bounded polling of long-running phases
//! - Wire types for ZAP responses and alerts

pub mod client;
pub mod poll;
pub mod types;

pub use client::{parse_percent, EngineError, ZapClient, ZapClientConfig};
pub use poll::{poll_until, PollPolicy};
pub use types::Alert;

use async_trait::async_trait;

/// Control verbs of a scanning engine.
///
/// Spider and active scans are started asynchronously by the engine and
/// identified by the id it returns; progress is reported as percent complete.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    /// Engine version, also used as a reachability probe
    async fn version(&self) -> Result<String, EngineError>;

    /// Have the engine request the target so it enters the site tree
    async fn access_url(&self, url: &str) -> Result<(), EngineError>;

    async fn start_spider(&self, url: &str) -> Result<String, EngineError>;

    async fn spider_progress(&self, scan_id: &str) -> Result<u8, EngineError>;

    /// Records still queued for passive analysis
    async fn passive_records_remaining(&self) -> Result<u64, EngineError>;

    async fn start_active_scan(&self, url: &str) -> Result<String, EngineError>;

    async fn active_scan_progress(&self, scan_id: &str) -> Result<u8, EngineError>;

    /// Every alert the engine holds whose URL starts with `base_url`
    async fn alerts(&self, base_url: &str) -> Result<Vec<Alert>, EngineError>;
}
