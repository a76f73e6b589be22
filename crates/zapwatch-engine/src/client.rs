//! HTTP client for the ZAP JSON control API
//!
//! Endpoints used (all `GET {endpoint}/JSON/<component>/<view|action>/<name>/`):
//! - core/view/version
//! - core/action/accessUrl
//! - spider/action/scan, spider/view/status
//! - pscan/view/recordsToScan
//! - ascan/action/scan, ascan/view/status
//! - core/view/alerts

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{
    Alert, AlertsResponse, ApiErrorBody, RecordsToScanResponse, ScanStartedResponse,
    StatusResponse, VersionResponse,
};
use crate::ScanEngine;

const API_KEY_HEADER: &str = "X-ZAP-API-Key";

// ── Configuration ────────────────────────────────────────────────────────────

/// Configuration for the engine client
#[derive(Debug, Clone)]
pub struct ZapClientConfig {
    /// Base URL of the engine (e.g. "http://127.0.0.1:8080")
    pub endpoint: String,
    /// API key configured in the engine
    pub api_key: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Alerts fetched per request
    pub alert_page_size: u32,
}

impl Default for ZapClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://127.0.0.1:8080"),
            api_key: String::from("changeme"),
            request_timeout: Duration::from_secs(60),
            alert_page_size: 500,
        }
    }
}

// ── Client Errors ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Engine API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected engine response: {0}")]
    InvalidResponse(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl From<EngineError> for zapwatch_core::Error {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Api { status, message } => zapwatch_core::Error::EngineApi { status, message },
            EngineError::NotConfigured(msg) => zapwatch_core::Error::Configuration(msg),
            other => zapwatch_core::Error::Engine(other.to_string()),
        }
    }
}

// ── Engine Client ────────────────────────────────────────────────────────────

/// Client for a running ZAP instance
pub struct ZapClient {
    config: ZapClientConfig,
    http: Client,
}

impl ZapClient {
    /// Create a new engine client
    pub fn new(config: ZapClientConfig) -> Result<Self, EngineError> {
        if config.endpoint.trim().is_empty() {
            return Err(EngineError::NotConfigured("engine endpoint is required".into()));
        }
        if config.alert_page_size == 0 {
            return Err(EngineError::NotConfigured(
                "alert page size must be positive".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("ZapWatch/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, http })
    }

    /// Engine endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn api_url(&self, component: &str, kind: &str, name: &str) -> String {
        format!(
            "{}/JSON/{}/{}/{}/",
            self.config.endpoint.trim_end_matches('/'),
            component,
            kind,
            name
        )
    }

    async fn call<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, EngineError> {
        debug!(url = %url, "Engine call");

        let res = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .query(query)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<ApiErrorBody>(&body).ok();
            let message = match parsed {
                Some(err) if !err.message.is_empty() => err.message,
                Some(err) if !err.code.is_empty() => err.code,
                _ => body,
            };
            return Err(EngineError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch one page of alerts for a base URL
    pub async fn alerts_page(
        &self,
        base_url: &str,
        start: u32,
        count: u32,
    ) -> Result<Vec<Alert>, EngineError> {
        let body: AlertsResponse = self
            .call(
                self.api_url("core", "view", "alerts"),
                &[
                    ("baseurl", base_url.to_string()),
                    ("start", start.to_string()),
                    ("count", count.to_string()),
                ],
            )
            .await?;
        Ok(body.alerts)
    }
}

#[async_trait]
impl ScanEngine for ZapClient {
    async fn version(&self) -> Result<String, EngineError> {
        let body: VersionResponse = self.call(self.api_url("core", "view", "version"), &[]).await?;
        Ok(body.version)
    }

    async fn access_url(&self, url: &str) -> Result<(), EngineError> {
        let _: serde_json::Value = self
            .call(
                self.api_url("core", "action", "accessUrl"),
                &[("url", url.to_string()), ("followRedirects", "true".to_string())],
            )
            .await?;
        Ok(())
    }

    async fn start_spider(&self, url: &str) -> Result<String, EngineError> {
        let body: ScanStartedResponse = self
            .call(self.api_url("spider", "action", "scan"), &[("url", url.to_string())])
            .await?;
        Ok(body.scan)
    }

    async fn spider_progress(&self, scan_id: &str) -> Result<u8, EngineError> {
        let body: StatusResponse = self
            .call(
                self.api_url("spider", "view", "status"),
                &[("scanId", scan_id.to_string())],
            )
            .await?;
        parse_percent(&body.status)
    }

    async fn passive_records_remaining(&self) -> Result<u64, EngineError> {
        let body: RecordsToScanResponse = self
            .call(self.api_url("pscan", "view", "recordsToScan"), &[])
            .await?;
        body.records_to_scan.trim().parse().map_err(|_| {
            EngineError::InvalidResponse(format!(
                "recordsToScan is not a number: '{}'",
                body.records_to_scan
            ))
        })
    }

    async fn start_active_scan(&self, url: &str) -> Result<String, EngineError> {
        let body: ScanStartedResponse = self
            .call(
                self.api_url("ascan", "action", "scan"),
                &[("url", url.to_string()), ("recurse", "true".to_string())],
            )
            .await?;
        Ok(body.scan)
    }

    async fn active_scan_progress(&self, scan_id: &str) -> Result<u8, EngineError> {
        let body: StatusResponse = self
            .call(
                self.api_url("ascan", "view", "status"),
                &[("scanId", scan_id.to_string())],
            )
            .await?;
        parse_percent(&body.status)
    }

    async fn alerts(&self, base_url: &str) -> Result<Vec<Alert>, EngineError> {
        let page_size = self.config.alert_page_size;
        let mut alerts = Vec::new();

        loop {
            let page = self
                .alerts_page(base_url, alerts.len() as u32, page_size)
                .await?;
            let short_page = (page.len() as u32) < page_size;
            alerts.extend(page);
            if short_page {
                break;
            }
        }

        debug!(base_url, count = alerts.len(), "Alerts fetched");
        Ok(alerts)
    }
}

/// Parse a percent-complete string, clamped to 100
pub fn parse_percent(raw: &str) -> Result<u8, EngineError> {
    raw.trim()
        .parse::<u32>()
        .map(|p| p.min(100) as u8)
        .map_err(|_| EngineError::InvalidResponse(format!("progress is not a number: '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, page_size: u32) -> ZapClient {
        ZapClient::new(ZapClientConfig {
            endpoint: server.uri(),
            api_key: String::from("test-key"),
            request_timeout: Duration::from_secs(5),
            alert_page_size: page_size,
        })
        .unwrap()
    }

    fn alert_json(name: &str, risk: &str) -> serde_json::Value {
        json!({ "alert": name, "risk": risk, "confidence": "Medium", "url": "http://example.test/" })
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("0").unwrap(), 0);
        assert_eq!(parse_percent(" 42 ").unwrap(), 42);
        assert_eq!(parse_percent("100").unwrap(), 100);
        assert_eq!(parse_percent("250").unwrap(), 100);
        assert!(matches!(
            parse_percent("does_not_exist"),
            Err(EngineError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_requires_endpoint() {
        let config = ZapClientConfig {
            endpoint: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            ZapClient::new(config),
            Err(EngineError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_version_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/JSON/core/view/version/"))
            .and(header("X-ZAP-API-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "2.14.0" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 500);
        assert_eq!(client.version().await.unwrap(), "2.14.0");
    }

    #[tokio::test]
    async fn test_spider_start_and_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/JSON/spider/action/scan/"))
            .and(query_param("url", "http://example.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "scan": "3" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/JSON/spider/view/status/"))
            .and(query_param("scanId", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "65" })))
            .mount(&server)
            .await;

        let client = client_for(&server, 500);
        let id = client.start_spider("http://example.test").await.unwrap();
        assert_eq!(id, "3");
        assert_eq!(client.spider_progress(&id).await.unwrap(), 65);
    }

    #[tokio::test]
    async fn test_active_scan_and_passive_queue() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/JSON/ascan/action/scan/"))
            .and(query_param("recurse", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "scan": "7" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/JSON/ascan/view/status/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "100" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/JSON/pscan/view/recordsToScan/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "recordsToScan": "12" })))
            .mount(&server)
            .await;

        let client = client_for(&server, 500);
        let id = client.start_active_scan("http://example.test").await.unwrap();
        assert_eq!(client.active_scan_progress(&id).await.unwrap(), 100);
        assert_eq!(client.passive_records_remaining().await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/JSON/core/action/accessUrl/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "bad_api_key",
                "message": "Missing or invalid API key"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 500);
        match client.access_url("http://example.test").await {
            Err(EngineError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Missing or invalid API key");
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_alerts_are_paged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/JSON/core/view/alerts/"))
            .and(query_param("baseurl", "http://example.test"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "alerts": [alert_json("SQL Injection", "High"), alert_json("XSS", "High")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/JSON/core/view/alerts/"))
            .and(query_param("start", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "alerts": [alert_json("Server Leaks Version", "Low")]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 2);
        let alerts = client.alerts("http://example.test").await.unwrap();
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[2].title(), "Server Leaks Version");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/JSON/spider/view/status/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, 500);
        let err = client.spider_progress("0").await.unwrap_err();
        assert!(matches!(err, EngineError::Json(_)));
        assert!(matches!(
            zapwatch_core::Error::from(err),
            zapwatch_core::Error::Engine(_)
        ));
    }
}
