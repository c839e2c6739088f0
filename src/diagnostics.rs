//! Collector for recoverable failures raised during an audit run.
//!
//! Map-scoped and item-scoped failures do not stop the run. They are
//! recorded here and reported as a warning count once the audit completes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Where a recoverable failure happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "subject", rename_all = "snake_case")]
pub enum ErrorContext {
    /// Search for one shield map failed; the map was skipped.
    MapSearch(String),
    /// Hostname lookup for one property failed; the property was kept.
    HostnameResolve(String),
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorContext::MapSearch(map) => write!(f, "map-search:{}", map),
            ErrorContext::HostnameResolve(prop) => write!(f, "hostnames:{}", prop),
        }
    }
}

/// One recorded failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub context: ErrorContext,
    pub message: String,
}

/// Accumulates recoverable failures for one run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<ErrorEntry>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure under `context`.
    pub fn record(&mut self, context: ErrorContext, error: &dyn fmt::Display) {
        self.entries.push(ErrorEntry {
            timestamp: Utc::now(),
            context,
            message: error.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Number of entries recorded for a given kind of context.
    pub fn count_where(&self, pred: impl Fn(&ErrorContext) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.context)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_by_default() {
        let diag = Diagnostics::new();
        assert!(diag.is_empty());
        assert_eq!(diag.len(), 0);
    }

    #[test]
    fn test_record_and_count() {
        let mut diag = Diagnostics::new();
        diag.record(ErrorContext::MapSearch("s1.example.net".into()), &"HTTP 500");
        diag.record(ErrorContext::HostnameResolve("www".into()), &"timeout");
        diag.record(ErrorContext::HostnameResolve("api".into()), &"timeout");

        assert_eq!(diag.len(), 3);
        assert_eq!(
            diag.count_where(|c| matches!(c, ErrorContext::HostnameResolve(_))),
            2
        );
        assert_eq!(diag.entries()[0].message, "HTTP 500");
        assert_eq!(diag.entries()[0].context.to_string(), "map-search:s1.example.net");
    }
}
