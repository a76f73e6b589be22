//! Console summaries: a single scan and recent scan history

use std::fmt::Write as _;

use zapwatch_core::Scan;

const RULE_WIDTH: usize = 60;

/// Summary block printed after a scan
pub fn render_summary(scan: &Scan) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "SCAN SUMMARY");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Scan ID: {}", scan.id);
    let _ = writeln!(out, "Target URL: {}", scan.target_url);
    let _ = writeln!(out, "Scan Type: {}", scan.scan_type);
    let _ = writeln!(out, "Total Vulnerabilities: {}", scan.total_alerts);
    let _ = writeln!(out, "High Risk: {}", scan.high_risk);
    let _ = writeln!(out, "Medium Risk: {}", scan.medium_risk);
    let _ = writeln!(out, "Low Risk: {}", scan.low_risk);
    let _ = writeln!(out, "Informational: {}", scan.counts().informational());
    let _ = writeln!(out, "Status: {}", scan.status);
    if let Some(duration) = scan.duration() {
        let _ = writeln!(out, "Duration: {}s", duration.num_seconds());
    }
    let _ = writeln!(out, "{}", rule);

    out
}

/// Table of recent scans, in the order given
pub fn render_history(scans: &[Scan]) -> String {
    if scans.is_empty() {
        return String::from("No scans recorded yet.\n");
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<40} {:<9} {:<10} {:>6} {:>5} {:>7} {:>5}  {}",
        "ID", "Target", "Type", "Status", "Total", "High", "Medium", "Low", "Started"
    );
    let _ = writeln!(out, "{}", "-".repeat(110));

    for scan in scans {
        let _ = writeln!(
            out,
            "{:<6} {:<40} {:<9} {:<10} {:>6} {:>5} {:>7} {:>5}  {}",
            scan.id,
            truncate(&scan.target_url, 40),
            scan.scan_type.as_str(),
            scan.status.as_str(),
            scan.total_alerts,
            scan.high_risk,
            scan.medium_risk,
            scan.low_risk,
            scan.start_time.format("%Y-%m-%d %H:%M"),
        );
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use zapwatch_core::{ScanStatus, ScanType};

    fn scan(id: i64, target: &str) -> Scan {
        Scan {
            id,
            target_url: target.to_string(),
            scan_type: ScanType::Quick,
            start_time: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            end_time: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 42, 5).unwrap()),
            total_alerts: 9,
            high_risk: 1,
            medium_risk: 3,
            low_risk: 4,
            status: ScanStatus::Completed,
        }
    }

    #[test]
    fn test_summary() {
        let out = render_summary(&scan(3, "http://example.test"));
        assert!(out.contains("Target URL: http://example.test"));
        assert!(out.contains("Total Vulnerabilities: 9"));
        assert!(out.contains("Informational: 1"));
        assert!(out.contains("Status: completed"));
        assert!(out.contains("Duration: 725s"));
    }

    #[test]
    fn test_history() {
        let long = format!("http://{}.test", "a".repeat(60));
        let out = render_history(&[scan(2, "http://example.test"), scan(1, &long)]);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2 "));
        assert!(lines[2].contains("2026-03-01 09:30"));
        assert!(lines[3].contains("..."));
        assert!(!lines[3].contains(&long));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(render_history(&[]), "No scans recorded yet.\n");
    }
}
