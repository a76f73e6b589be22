//! Wire types of the ZAP JSON API
//!
//! ZAP encodes numbers as strings (`{"status":"42"}`), so every field is
//! kept as text here and parsed by the client.

use serde::Deserialize;
use zapwatch_core::{NewVulnerability, RiskLevel};

/// `core/view/version`
#[derive(Debug, Clone, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// `spider/action/scan` and `ascan/action/scan`
#[derive(Debug, Clone, Deserialize)]
pub struct ScanStartedResponse {
    pub scan: String,
}

/// `spider/view/status` and `ascan/view/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// `pscan/view/recordsToScan`
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsToScanResponse {
    #[serde(rename = "recordsToScan")]
    pub records_to_scan: String,
}

/// `core/view/alerts`
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsResponse {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Body of a non-2xx ZAP answer
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// One alert raised by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub id: Option<String>,
    #[serde(rename = "pluginId")]
    pub plugin_id: Option<String>,
    pub alert: Option<String>,
    pub name: Option<String>,
    pub risk: Option<String>,
    pub confidence: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub solution: Option<String>,
    pub reference: Option<String>,
}

impl Alert {
    /// Display name; older ZAP versions only send `alert`, newer also `name`
    pub fn title(&self) -> &str {
        [self.alert.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("Unknown")
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_engine(self.risk.as_deref().unwrap_or_default())
    }
}

impl From<&Alert> for NewVulnerability {
    fn from(a: &Alert) -> Self {
        NewVulnerability::builder(a.title())
            .risk(a.risk_level())
            .confidence(a.confidence.clone().unwrap_or_else(|| String::from("Unknown")))
            .url(a.url.clone().unwrap_or_default())
            .description(a.description.clone().unwrap_or_default())
            .solution(a.solution.clone().unwrap_or_default())
            .reference(a.reference.clone().unwrap_or_default())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_deserialize() {
        let json = r#"{
            "sourceid": "3",
            "pluginId": "10038",
            "cweid": "693",
            "confidence": "High",
            "description": "Content Security Policy (CSP) is an added layer of security",
            "url": "http://example.test/",
            "reference": "https://developer.mozilla.org/en-US/docs/Web/Security/CSP",
            "solution": "Set the Content-Security-Policy header.",
            "alert": "Content Security Policy (CSP) Header Not Set",
            "name": "Content Security Policy (CSP) Header Not Set",
            "risk": "Medium",
            "id": "0"
        }"#;

        let alert: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.plugin_id.as_deref(), Some("10038"));
        assert_eq!(alert.risk_level(), RiskLevel::Medium);

        let finding = NewVulnerability::from(&alert);
        assert_eq!(finding.alert_name, "Content Security Policy (CSP) Header Not Set");
        assert_eq!(finding.confidence, "High");
        assert_eq!(finding.url, "http://example.test/");
    }

    #[test]
    fn test_sparse_alert_defaults() {
        let alert: Alert = serde_json::from_str("{}").unwrap();
        let finding = NewVulnerability::from(&alert);

        assert_eq!(finding.alert_name, "Unknown");
        assert_eq!(finding.risk_level, RiskLevel::Informational);
        assert_eq!(finding.confidence, "Unknown");
        assert!(finding.description.is_empty());
        assert!(finding.reference.is_empty());
    }

    #[test]
    fn test_title_falls_back_to_name() {
        let alert = Alert {
            name: Some(String::from("Server Leaks Version")),
            ..Default::default()
        };
        assert_eq!(alert.title(), "Server Leaks Version");
    }
}
