//! Risk levels assigned by the scanning engine and per-scan risk tallies

use serde::{Deserialize, Serialize};

/// Risk level of a finding, as reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Informational finding, counted in totals but in no risk bucket
    #[default]
    Informational,
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

impl RiskLevel {
    /// Parse the engine's risk string. Anything unrecognised is Informational.
    pub fn from_engine(risk: &str) -> Self {
        match risk.trim().to_ascii_lowercase().as_str() {
            "high" => RiskLevel::High,
            "medium" => RiskLevel::Medium,
            "low" => RiskLevel::Low,
            _ => RiskLevel::Informational,
        }
    }

    /// Persisted and displayed form
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Informational => "Informational",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Lowercase CSS class suffix used by the HTML report
    pub fn css_class(&self) -> &'static str {
        match self {
            RiskLevel::Informational => "informational",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate counts stored on a scan row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub total: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl RiskCounts {
    /// Tally a batch of risk levels
    pub fn tally<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = RiskLevel>,
    {
        let mut counts = Self::default();
        for level in levels {
            counts.record(level);
        }
        counts
    }

    /// Record a single finding
    pub fn record(&mut self, level: RiskLevel) {
        self.total += 1;
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
            RiskLevel::Informational => {}
        }
    }

    /// Findings outside the three risk buckets
    pub fn informational(&self) -> u32 {
        self.total
            .saturating_sub(self.high + self.medium + self.low)
    }
}
