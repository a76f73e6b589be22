//! Scan runs: type selector, lifecycle status and the persisted summary row

use crate::error::{Error, Result};
use crate::risk::RiskCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which engine phases a scan drives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Spider + passive analysis
    #[default]
    Quick,
    /// Spider + passive + active probing
    Standard,
    /// Same phases as standard
    Deep,
}

impl ScanType {
    /// Map a console menu choice (1-3). Anything else falls back to quick.
    pub fn from_selection(choice: &str) -> Self {
        match choice.trim() {
            "2" => ScanType::Standard,
            "3" => ScanType::Deep,
            _ => ScanType::Quick,
        }
    }

    /// Whether the active probing phase runs
    pub fn runs_active_scan(&self) -> bool {
        !matches!(self, ScanType::Quick)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Quick => "quick",
            ScanType::Standard => "standard",
            ScanType::Deep => "deep",
        }
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(ScanType::Quick),
            "standard" => Ok(ScanType::Standard),
            "deep" => Ok(ScanType::Deep),
            other => Err(Error::Parse(format!("unknown scan type '{}'", other))),
        }
    }
}

/// Lifecycle of a scan row: running -> completed | failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScanStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(ScanStatus::Running),
            "completed" => Ok(ScanStatus::Completed),
            "failed" => Ok(ScanStatus::Failed),
            other => Err(Error::Parse(format!("unknown scan status '{}'", other))),
        }
    }
}

/// One scan run, as stored in the `scans` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: i64,
    pub target_url: String,
    pub scan_type: ScanType,
    pub start_time: DateTime<Utc>,
    /// Unset while the scan is running
    pub end_time: Option<DateTime<Utc>>,
    pub total_alerts: u32,
    pub high_risk: u32,
    pub medium_risk: u32,
    pub low_risk: u32,
    pub status: ScanStatus,
}

impl Scan {
    /// Summary counts of this scan
    pub fn counts(&self) -> RiskCounts {
        RiskCounts {
            total: self.total_alerts,
            high: self.high_risk,
            medium: self.medium_risk,
            low: self.low_risk,
        }
    }

    /// Wall-clock duration, once the scan has ended
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}
