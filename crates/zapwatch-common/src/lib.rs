//! ZapWatch Common - Shared utilities: configuration and logging

pub mod config;
pub mod logging;

pub use config::{Config, ConfigBuilder, EngineConfig, ReportConfig, ScanConfig, StoreConfig};
pub use logging::{init_logging_with_config, LogConfig, LogFormat};
