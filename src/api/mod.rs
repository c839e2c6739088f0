//! Collaborator interfaces for the property search and hostname APIs.
//!
//! The audit core only depends on the traits below. [`http::HttpApi`]
//! implements both against the remote property-manager API.

pub mod http;

use async_trait::async_trait;
use std::fmt;

use crate::error::{ResolveError, SearchError};
use crate::model::PropertyRecord;

#[cfg(test)]
use mockall::automock;

pub use http::HttpApi;

/// Behavior name carried by shielded properties.
pub const SHIELD_BEHAVIOR: &str = "siteShield";

/// Property search predicates used by the audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Has a shield behavior bound to this exact map.
    ShieldMap(String),
    /// Has any shield behavior.
    AnyShieldBehavior,
    /// Has the behavior used as a proxy for "real, addressable property".
    Universe { behavior: String },
}

impl Predicate {
    /// JSONPath match expression understood by the bulk search endpoint.
    pub fn to_jsonpath(&self) -> String {
        match self {
            Predicate::ShieldMap(map) => format!(
                "$..behaviors[?(@.name == '{}' && @.options.ssmap.value == '{}')]",
                SHIELD_BEHAVIOR,
                escape_literal(map)
            ),
            Predicate::AnyShieldBehavior => {
                format!("$..behaviors[?(@.name == '{}')]", SHIELD_BEHAVIOR)
            }
            Predicate::Universe { behavior } => {
                format!("$..behaviors[?(@.name == '{}')]", escape_literal(behavior))
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::ShieldMap(map) => write!(f, "shield map {}", map),
            Predicate::AnyShieldBehavior => f.write_str("any shield behavior"),
            Predicate::Universe { behavior } => write!(f, "behavior {}", behavior),
        }
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Searches property versions by rule-tree predicate.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PropertySearch: Send + Sync {
    /// Property versions matching `predicate`, all statuses included.
    async fn search(&self, predicate: &Predicate) -> Result<Vec<PropertyRecord>, SearchError>;

    /// Identifiers of every shield map visible to the account.
    async fn shield_map_names(&self) -> Result<Vec<String>, SearchError>;
}

/// Resolves the hostnames bound to a property version.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HostnameResolver: Send + Sync {
    async fn resolve(&self, record: &PropertyRecord) -> Result<Vec<String>, ResolveError>;
}
