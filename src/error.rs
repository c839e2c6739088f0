//! Error types for shieldaudit.

use thiserror::Error;

/// Failure of the property search collaborator (transport, auth, decoding).
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Failure to resolve hostnames for one property version.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} for {property}")]
    Http { property: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing {field} for {property}")]
    MissingField {
        property: String,
        field: &'static str,
    },
}

/// Run-level errors. Discovery and Universe abort the audit.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Shield map discovery failed: {0}")]
    Discovery(#[source] SearchError),

    #[error("Active property query failed: {0}")]
    Universe(#[source] SearchError),

    #[error("Usage error: {0}")]
    Usage(String),
}

impl AuditError {
    /// Whether this error must abort the run with a non-zero exit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuditError::Discovery(_) | AuditError::Universe(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AuditError::Discovery(SearchError::Network("down".into())).is_fatal());
        assert!(AuditError::Universe(SearchError::Parse("bad".into())).is_fatal());
        assert!(!AuditError::Usage("both flags".into()).is_fatal());
    }

    #[test]
    fn test_display_includes_cause() {
        let err = AuditError::Discovery(SearchError::Http {
            status: 403,
            body: "forbidden".into(),
        });
        let msg = err.to_string();
        assert!(msg.contains("discovery"));
        assert!(msg.contains("403"));
    }
}
