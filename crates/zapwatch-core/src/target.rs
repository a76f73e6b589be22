//! Scan target definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Site scanned when the console prompt is left empty
pub const DEFAULT_TARGET: &str = "http://testphp.vulnweb.com";

/// A web application to scan, identified by its base URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    url: String,
}

impl ScanTarget {
    /// Parse a target URL. Only absolute http(s) URLs with a host are accepted.
    /// The trimmed input is kept as entered; it is the engine's alert prefix.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidTarget(String::from("empty target")));
        }

        let parsed = Url::parse(s).map_err(|e| Error::InvalidTarget(format!("{}: {}", s, e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::InvalidTarget(format!(
                    "{}: unsupported scheme '{}'",
                    s, scheme
                )))
            }
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(Error::InvalidTarget(format!("{}: missing host", s)));
        }

        Ok(Self { url: s.to_string() })
    }

    /// Parse user input, substituting the default site for an empty answer
    pub fn parse_or_default(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            Self::parse(DEFAULT_TARGET)
        } else {
            Self::parse(s)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
