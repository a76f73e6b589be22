//! ZapWatch Store - SQLite persistence for scans and findings
//!
//! Two flat tables:
//! - `scans`: one row per scan run with aggregate risk counts and status
//! - `vulnerabilities`: one row per finding, keyed to its scan
//!
//! The schema is created on first use. Storing a scan's findings and its
//! summary happens in one transaction.

pub mod database;

pub use database::ResultStore;
