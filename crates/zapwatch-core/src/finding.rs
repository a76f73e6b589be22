//! Findings reported by the engine for a scan

use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// A stored finding, as read back from the `vulnerabilities` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: i64,
    pub scan_id: i64,
    pub alert_name: String,
    pub risk_level: RiskLevel,
    pub confidence: String,
    pub url: String,
    pub description: String,
    pub solution: String,
    pub reference: String,
}

/// A finding that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVulnerability {
    pub alert_name: String,
    pub risk_level: RiskLevel,
    pub confidence: String,
    pub url: String,
    pub description: String,
    pub solution: String,
    pub reference: String,
}

impl NewVulnerability {
    /// Create a new finding builder
    pub fn builder(alert_name: impl Into<String>) -> NewVulnerabilityBuilder {
        NewVulnerabilityBuilder::new(alert_name)
    }
}

/// Builder for constructing findings
pub struct NewVulnerabilityBuilder {
    finding: NewVulnerability,
}

impl NewVulnerabilityBuilder {
    pub fn new(alert_name: impl Into<String>) -> Self {
        Self {
            finding: NewVulnerability {
                alert_name: alert_name.into(),
                risk_level: RiskLevel::Informational,
                confidence: String::from("Unknown"),
                url: String::new(),
                description: String::new(),
                solution: String::new(),
                reference: String::new(),
            },
        }
    }

    pub fn risk(mut self, risk: RiskLevel) -> Self {
        self.finding.risk_level = risk;
        self
    }

    pub fn confidence(mut self, confidence: impl Into<String>) -> Self {
        self.finding.confidence = confidence.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.finding.url = url.into();
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.finding.description = desc.into();
        self
    }

    pub fn solution(mut self, solution: impl Into<String>) -> Self {
        self.finding.solution = solution.into();
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.finding.reference = reference.into();
        self
    }

    pub fn build(self) -> NewVulnerability {
        self.finding
    }
}
