//! ZapWatch Report - rendering stored scans for people
//!
//! - `html`: self-contained HTML report of one scan and its findings
//! - `compare`: signed deltas between two scans' summary counts
//! - `summary`: console summary of a scan and the recent-scan table

pub mod compare;
pub mod html;
pub mod summary;

pub use compare::{compare_scans, MetricDelta, ScanComparison};
pub use html::{generate_report, render_html};
pub use summary::{render_history, render_summary};
