//! Configuration management for ZapWatch

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use zapwatch_core::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scanning engine connection settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Scan sequencing and polling settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Result store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (ZAPWATCH_ prefix)
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Engine settings
        if let Some(val) = var("ZAPWATCH_ENGINE_ENDPOINT") {
            self.engine.endpoint = val;
        }
        if let Some(val) = var("ZAPWATCH_ENGINE_API_KEY") {
            self.engine.api_key = val;
        }

        // Store
        if let Some(val) = var("ZAPWATCH_DATABASE_PATH") {
            self.store.database_path = PathBuf::from(val);
        }

        // Report
        if let Some(val) = var("ZAPWATCH_REPORT_DIR") {
            self.report.output_dir = PathBuf::from(val);
        }

        // Logging
        if let Some(val) = var("ZAPWATCH_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = var("ZAPWATCH_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }
}

/// Engine (ZAP) connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the engine's control API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key sent with every call
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_endpoint() -> String {
    String::from("http://127.0.0.1:8080")
}

fn default_api_key() -> String {
    String::from("changeme")
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: default_api_key(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl EngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Scan sequencing configuration
///
/// Every poll loop is capped; a phase that never converges fails the scan
/// after `*_max_polls` checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Pause after opening the target, in milliseconds
    #[serde(default = "default_settle")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_spider_interval")]
    pub spider_poll_interval_ms: u64,
    #[serde(default = "default_spider_polls")]
    pub spider_max_polls: u32,

    #[serde(default = "default_passive_interval")]
    pub passive_poll_interval_ms: u64,
    #[serde(default = "default_passive_polls")]
    pub passive_max_polls: u32,

    #[serde(default = "default_active_interval")]
    pub active_poll_interval_ms: u64,
    #[serde(default = "default_active_polls")]
    pub active_max_polls: u32,

    /// Alerts requested per page
    #[serde(default = "default_page_size")]
    pub alert_page_size: u32,
}

fn default_settle() -> u64 {
    2_000
}

fn default_spider_interval() -> u64 {
    2_000
}

fn default_spider_polls() -> u32 {
    900
}

fn default_passive_interval() -> u64 {
    1_000
}

fn default_passive_polls() -> u32 {
    300
}

fn default_active_interval() -> u64 {
    5_000
}

fn default_active_polls() -> u32 {
    1_440
}

fn default_page_size() -> u32 {
    500
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle(),
            spider_poll_interval_ms: default_spider_interval(),
            spider_max_polls: default_spider_polls(),
            passive_poll_interval_ms: default_passive_interval(),
            passive_max_polls: default_passive_polls(),
            active_poll_interval_ms: default_active_interval(),
            active_max_polls: default_active_polls(),
            alert_page_size: default_page_size(),
        }
    }
}

/// Result store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("scan_results.db")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving generated reports
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl ReportConfig {
    /// Default report location for a scan
    pub fn report_path(&self, scan_id: i64) -> PathBuf {
        self.output_dir
            .join(format!("security_report_{}.html", scan_id))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Include source locations in log events
    #[serde(default)]
    pub with_file: bool,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("compact")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            with_file: false,
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn engine_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.engine.endpoint = endpoint.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.engine.api_key = key.into();
        self
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.database_path = path.into();
        self
    }

    pub fn report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.report.output_dir = dir.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [engine]
            endpoint = "http://zap.internal:8090"
            api_key = "secret-key"

            [scan]
            spider_max_polls = 10

            [store]
            database_path = "/var/lib/zapwatch/results.db"

            [logging]
            level = "debug"
            format = "json"
            with_file = true
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.engine.endpoint, "http://zap.internal:8090");
        assert_eq!(config.engine.api_key, "secret-key");
        assert_eq!(config.engine.request_timeout_seconds, 60);
        assert_eq!(config.scan.spider_max_polls, 10);
        assert_eq!(config.scan.spider_poll_interval_ms, 2_000);
        assert_eq!(
            config.store.database_path,
            PathBuf::from("/var/lib/zapwatch/results.db")
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.with_file);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.endpoint, "http://127.0.0.1:8080");
        assert_eq!(config.engine.api_key, "changeme");
        assert_eq!(config.store.database_path, PathBuf::from("scan_results.db"));
        assert_eq!(
            config.report.report_path(4),
            PathBuf::from("./security_report_4.html")
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\noutput_dir = \"reports\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.report.output_dir, PathBuf::from("reports"));

        assert!(matches!(
            Config::from_file("/nonexistent/zapwatch.toml"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml("[engine\nendpoint = 1").is_err());
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("ZAPWATCH_ENGINE_ENDPOINT", "http://10.0.0.5:8080"),
            ("ZAPWATCH_DATABASE_PATH", "/tmp/scans.db"),
            ("ZAPWATCH_LOG_LEVEL", "warn"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().merge_vars(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.engine.endpoint, "http://10.0.0.5:8080");
        assert_eq!(config.engine.api_key, "changeme");
        assert_eq!(config.store.database_path, PathBuf::from("/tmp/scans.db"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .engine_endpoint("http://localhost:8090")
            .api_key("key123")
            .database_path("results.db")
            .log_level("warn")
            .build();

        assert_eq!(config.engine.endpoint, "http://localhost:8090");
        assert_eq!(config.engine.api_key, "key123");
        assert_eq!(config.store.database_path, PathBuf::from("results.db"));
        assert_eq!(config.logging.level, "warn");
    }
}
