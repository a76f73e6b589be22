//! Self-contained HTML report for one scan

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use html_escape::encode_text;
use tracing::info;
use zapwatch_core::{Error, Result, Scan, Vulnerability};
use zapwatch_store::ResultStore;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }
        .header { background: #2c3e50; color: white; padding: 30px; border-radius: 10px; }
        .summary { display: grid; grid-template-columns: repeat(4, 1fr); gap: 20px; margin: 20px 0; }
        .card { background: white; padding: 20px; border-radius: 10px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
        .high { border-left: 5px solid #e74c3c; }
        .medium { border-left: 5px solid #f39c12; }
        .low { border-left: 5px solid #3498db; }
        .informational { border-left: 5px solid #95a5a6; }
        .vuln-item { background: white; padding: 20px; margin: 10px 0; border-radius: 10px; }
        .vuln-item p { white-space: pre-line; overflow-wrap: anywhere; }
        .risk-high { color: #e74c3c; }
        .risk-medium { color: #f39c12; }
        .risk-low { color: #3498db; }
        .risk-informational { color: #7f8c8d; }
"#;

/// Render the report document for a scan and its findings.
///
/// Every value taken from the scan or its findings is HTML-escaped.
pub fn render_html(scan: &Scan, vulns: &[Vulnerability]) -> String {
    let mut html = String::with_capacity(4096 + vulns.len() * 1024);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Security Scan Report #{id}</title>
    <style>{style}    </style>
</head>
<body>
    <div class="header">
        <h1>Web Application Security Report</h1>
        <p><strong>Target:</strong> {target}</p>
        <p><strong>Scan Type:</strong> {scan_type}</p>
        <p><strong>Date:</strong> {date}</p>
        <p><strong>Status:</strong> {status}</p>
    </div>

    <div class="summary">
        <div class="card">
            <h3>Total Issues</h3>
            <h1>{total}</h1>
        </div>
        <div class="card high">
            <h3>High Risk</h3>
            <h1 class="risk-high">{high}</h1>
        </div>
        <div class="card medium">
            <h3>Medium Risk</h3>
            <h1 class="risk-medium">{medium}</h1>
        </div>
        <div class="card low">
            <h3>Low Risk</h3>
            <h1 class="risk-low">{low}</h1>
        </div>
    </div>

    <h2>Detailed Findings</h2>
"#,
        id = scan.id,
        style = STYLE,
        target = encode_text(&scan.target_url),
        scan_type = scan.scan_type,
        date = scan.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
        status = scan.status,
        total = scan.total_alerts,
        high = scan.high_risk,
        medium = scan.medium_risk,
        low = scan.low_risk,
    );

    if vulns.is_empty() {
        html.push_str("    <p>No findings were reported for this target.</p>\n");
    }

    for vuln in vulns {
        write_finding(&mut html, vuln);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn write_finding(html: &mut String, vuln: &Vulnerability) {
    let class = vuln.risk_level.css_class();

    let _ = write!(
        html,
        r#"
    <div class="vuln-item {class}">
        <h3>{name} <span class="risk-{class}">[{risk}]</span></h3>
        <p><strong>URL:</strong> {url}</p>
        <p><strong>Description:</strong> {description}</p>
        <p><strong>Solution:</strong> {solution}</p>
        <p><strong>Confidence:</strong> {confidence}</p>
"#,
        class = class,
        name = encode_text(&vuln.alert_name),
        risk = vuln.risk_level,
        url = encode_text(&vuln.url),
        description = encode_text(&vuln.description),
        solution = encode_text(&vuln.solution),
        confidence = encode_text(&vuln.confidence),
    );

    if !vuln.reference.trim().is_empty() {
        let _ = writeln!(
            html,
            "        <p><strong>Reference:</strong> {}</p>",
            encode_text(&vuln.reference)
        );
    }

    html.push_str("    </div>\n");
}

/// Render the report for `scan_id` and write it to `output`.
///
/// A missing scan yields [`Error::ScanNotFound`] and nothing is written.
pub fn generate_report(store: &ResultStore, scan_id: i64, output: &Path) -> Result<PathBuf> {
    let scan = store
        .get_scan(scan_id)?
        .ok_or(Error::ScanNotFound { id: scan_id })?;
    let vulns = store.get_vulnerabilities(scan_id)?;

    let html = render_html(&scan, &vulns);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, html)?;

    info!(scan_id, findings = vulns.len(), "Report generated: {}", output.display());
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zapwatch_core::{NewVulnerability, RiskLevel, ScanType};

    fn seeded_store() -> (ResultStore, i64) {
        let store = ResultStore::in_memory().unwrap();
        let id = store
            .create_scan("http://example.test/?a=1&b=2", ScanType::Standard)
            .unwrap();
        store
            .complete_scan(
                id,
                &[
                    NewVulnerability::builder("Cross Site Scripting (Reflected)")
                        .risk(RiskLevel::High)
                        .confidence("Medium")
                        .url("http://example.test/search?q=<script>")
                        .description("Payload <script>alert(1)</script> was reflected")
                        .solution("Validate input & encode output")
                        .reference("https://owasp.org/www-community/attacks/xss/")
                        .build(),
                    NewVulnerability::builder("Modern Web Application")
                        .risk(RiskLevel::Informational)
                        .build(),
                ],
            )
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_render_escapes_finding_data() {
        let (store, id) = seeded_store();
        let scan = store.get_scan(id).unwrap().unwrap();
        let vulns = store.get_vulnerabilities(id).unwrap();

        let html = render_html(&scan, &vulns);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Validate input &amp; encode output"));
        assert!(html.contains("http://example.test/?a=1&amp;b=2"));
    }

    #[test]
    fn test_render_structure() {
        let (store, id) = seeded_store();
        let scan = store.get_scan(id).unwrap().unwrap();
        let vulns = store.get_vulnerabilities(id).unwrap();

        let html = render_html(&scan, &vulns);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<h1 class="risk-high">1</h1>"#));
        assert!(html.contains(r#"<div class="vuln-item high">"#));
        assert!(html.contains(r#"<span class="risk-informational">[Informational]</span>"#));
        assert_eq!(html.matches(r#"<div class="vuln-item"#).count(), 2);
        assert_eq!(html.matches("<strong>Reference:</strong>").count(), 1);
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_without_findings() {
        let store = ResultStore::in_memory().unwrap();
        let id = store.create_scan("http://example.test", ScanType::Quick).unwrap();
        store.complete_scan(id, &[]).unwrap();
        let scan = store.get_scan(id).unwrap().unwrap();

        let html = render_html(&scan, &[]);
        assert!(html.contains("No findings were reported"));
    }

    #[test]
    fn test_generate_report_writes_file() {
        let (store, id) = seeded_store();
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("reports").join(format!("security_report_{}.html", id));

        let written = generate_report(&store, id, &output).unwrap();

        assert_eq!(written, output);
        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("Cross Site Scripting (Reflected)"));
    }

    #[test]
    fn test_missing_scan_writes_no_file() {
        let store = ResultStore::in_memory().unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("security_report_99.html");

        let err = generate_report(&store, 99, &output).unwrap_err();

        assert!(err.is_not_found());
        assert!(!output.exists());
    }
}
