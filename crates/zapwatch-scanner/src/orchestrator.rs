//! Scan orchestration: drives the engine through its phases and records the
//! outcome in the result store.
//!
//! Sequence: engine check -> open target -> spider -> passive analysis ->
//! active scan (standard/deep only) -> fetch alerts -> store.
//! Any failure after the scan row exists marks it failed.

use std::time::Duration;

use tracing::{error, info, warn};
use zapwatch_common::ScanConfig;
use zapwatch_core::{Error, NewVulnerability, Result, RiskCounts, ScanTarget, ScanType};
use zapwatch_engine::{poll_until, PollPolicy, ScanEngine};
use zapwatch_store::ResultStore;

/// Timing of the scan phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    /// Pause after the engine first opens the target
    pub settle_delay: Duration,
    pub spider: PollPolicy,
    pub passive: PollPolicy,
    pub active: PollPolicy,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for ScanSettings {
    fn from(c: &ScanConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(c.settle_delay_ms),
            spider: PollPolicy::from_millis(c.spider_poll_interval_ms, c.spider_max_polls),
            passive: PollPolicy::from_millis(c.passive_poll_interval_ms, c.passive_max_polls),
            active: PollPolicy::from_millis(c.active_poll_interval_ms, c.active_max_polls),
        }
    }
}

/// Terminal state of an orchestrated scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed { scan_id: i64, counts: RiskCounts },
    Failed { scan_id: i64, reason: String },
}

impl ScanOutcome {
    pub fn scan_id(&self) -> i64 {
        match self {
            ScanOutcome::Completed { scan_id, .. } | ScanOutcome::Failed { scan_id, .. } => *scan_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ScanOutcome::Completed { .. })
    }
}

/// Runs scans one at a time against an engine
pub struct Orchestrator<E> {
    engine: E,
    store: ResultStore,
    settings: ScanSettings,
}

impl<E: ScanEngine> Orchestrator<E> {
    pub fn new(engine: E, store: ResultStore, settings: ScanSettings) -> Self {
        Self {
            engine,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Run a full scan of `target`.
    ///
    /// Engine faults and poll timeouts do not surface as `Err`: the scan row
    /// is marked failed and [`ScanOutcome::Failed`] is returned. `Err` means
    /// the store itself could not record the scan.
    pub async fn run(&self, target: &ScanTarget, scan_type: ScanType) -> Result<ScanOutcome> {
        let scan_id = self.store.create_scan(target.as_str(), scan_type)?;
        info!(scan_id, target = %target, scan_type = %scan_type, "Starting scan");

        match self.drive(scan_id, target, scan_type).await {
            Ok(counts) => {
                info!(
                    scan_id,
                    total = counts.total,
                    high = counts.high,
                    medium = counts.medium,
                    low = counts.low,
                    "Scan completed"
                );
                Ok(ScanOutcome::Completed { scan_id, counts })
            }
            Err(e) => {
                error!(scan_id, code = e.code(), "Error during scan: {}", e);
                self.store.mark_failed(scan_id)?;
                Ok(ScanOutcome::Failed {
                    scan_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn drive(&self, scan_id: i64, target: &ScanTarget, scan_type: ScanType) -> Result<RiskCounts> {
        let url = target.as_str();
        let engine = &self.engine;

        let version = engine.version().await?;
        info!("Connected to scanning engine {}", version);

        info!("Accessing target URL...");
        engine.access_url(url).await?;
        tokio::time::sleep(self.settings.settle_delay).await;

        info!("Spidering the target...");
        let spider_id = engine.start_spider(url).await?;
        poll_until("Spider", &self.settings.spider, |_| {
            let spider_id = spider_id.as_str();
            async move {
                let progress = engine.spider_progress(spider_id).await?;
                info!("Spider progress: {}%", progress);
                Ok::<bool, Error>(progress >= 100)
            }
        })
        .await?;
        info!("Spider completed");

        info!("Running passive scan...");
        poll_until("Passive scan", &self.settings.passive, |_| async move {
            let remaining = engine.passive_records_remaining().await?;
            if remaining > 0 {
                info!("Passive scan records remaining: {}", remaining);
            }
            Ok::<bool, Error>(remaining == 0)
        })
        .await?;

        if scan_type.runs_active_scan() {
            info!("Starting active scan...");
            let active_id = engine.start_active_scan(url).await?;
            poll_until("Active scan", &self.settings.active, |_| {
                let active_id = active_id.as_str();
                async move {
                    let progress = engine.active_scan_progress(active_id).await?;
                    info!("Active scan progress: {}%", progress);
                    Ok::<bool, Error>(progress >= 100)
                }
            })
            .await?;
            info!("Active scan completed");
        }

        info!("Collecting results...");
        let alerts = engine.alerts(url).await?;
        if alerts.is_empty() {
            warn!(scan_id, "Engine reported no alerts for {}", url);
        }

        let findings: Vec<NewVulnerability> = alerts.iter().map(NewVulnerability::from).collect();
        self.store.complete_scan(scan_id, &findings)
    }
}
