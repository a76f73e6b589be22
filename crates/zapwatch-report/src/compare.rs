//! Side-by-side comparison of two scans' summary counts

use std::fmt::Write as _;

use zapwatch_core::{Error, Result, Scan};
use zapwatch_store::ResultStore;

const RULE_WIDTH: usize = 60;

/// One compared metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDelta {
    pub label: &'static str,
    pub first: u32,
    pub second: u32,
}

impl MetricDelta {
    /// Signed change from the first scan to the second
    pub fn delta(&self) -> i64 {
        i64::from(self.second) - i64::from(self.first)
    }
}

/// Two scans loaded for comparison
#[derive(Debug, Clone)]
pub struct ScanComparison {
    pub first: Scan,
    pub second: Scan,
}

impl ScanComparison {
    pub fn new(first: Scan, second: Scan) -> Self {
        Self { first, second }
    }

    /// Total, high, medium and low, in display order
    pub fn metrics(&self) -> [MetricDelta; 4] {
        let (a, b) = (self.first.counts(), self.second.counts());
        [
            MetricDelta {
                label: "Total Issues",
                first: a.total,
                second: b.total,
            },
            MetricDelta {
                label: "High Risk",
                first: a.high,
                second: b.high,
            },
            MetricDelta {
                label: "Medium Risk",
                first: a.medium,
                second: b.medium,
            },
            MetricDelta {
                label: "Low Risk",
                first: a.low,
                second: b.low,
            },
        ]
    }

    /// True when every metric is unchanged
    pub fn is_unchanged(&self) -> bool {
        self.metrics().iter().all(|m| m.delta() == 0)
    }

    /// Console table of the comparison
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE_WIDTH);

        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "SCAN COMPARISON");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out);
        let _ = writeln!(out, "Scan 1: {} ({})", self.first.target_url, self.first.start_time.to_rfc3339());
        let _ = writeln!(out, "Scan 2: {} ({})", self.second.target_url, self.second.start_time.to_rfc3339());
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<20} {:<15} {:<15} {}", "Metric", "Scan 1", "Scan 2", "Difference");
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        for m in self.metrics() {
            let _ = writeln!(out, "{:<20} {:<15} {:<15} {:+}", m.label, m.first, m.second, m.delta());
        }
        if self.is_unchanged() {
            let _ = writeln!(out, "\nNo change between the two scans.");
        }

        out
    }
}

/// Load two scans for comparison. Either id missing yields
/// [`Error::ScanNotFound`] naming the first absent id.
pub fn compare_scans(store: &ResultStore, first_id: i64, second_id: i64) -> Result<ScanComparison> {
    let first = store.get_scan(first_id)?;
    let second = store.get_scan(second_id)?;

    match (first, second) {
        (Some(first), Some(second)) => Ok(ScanComparison::new(first, second)),
        (None, _) => Err(Error::ScanNotFound { id: first_id }),
        (_, None) => Err(Error::ScanNotFound { id: second_id }),
    }
}
