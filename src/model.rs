//! Data model shared by the classifier, enricher, stats and exporters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display text of the placeholder entry for a map that matched nothing.
pub const EMPTY_MAP_MARKER: &str = "No properties found";

/// Suffix appended to the display name when hostname resolution failed.
pub const ERROR_MARKER: &str = "[ERROR]";

/// Name of the synthetic bucket wrapping unprotected properties in nested output.
pub const UNPROTECTED_BUCKET: &str = "UNPROTECTED";

/// Activation network a run is scoped to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Staging,
}

impl Environment {
    pub fn from_staging_flag(staging: bool) -> Self {
        if staging {
            Environment::Staging
        } else {
            Environment::Production
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => f.write_str("PRODUCTION"),
            Environment::Staging => f.write_str("STAGING"),
        }
    }
}

/// Activation status of a property version on one network.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationStatus {
    Active,
    #[default]
    Inactive,
    #[serde(other)]
    Other,
}

/// A property version as returned by the search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub property_id: String,
    pub property_version: u32,
    pub property_name: String,
    #[serde(default)]
    pub production_status: ActivationStatus,
    #[serde(default)]
    pub staging_status: ActivationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl PropertyRecord {
    pub fn status(&self, env: Environment) -> ActivationStatus {
        match env {
            Environment::Production => self.production_status,
            Environment::Staging => self.staging_status,
        }
    }

    pub fn is_active(&self, env: Environment) -> bool {
        self.status(env) == ActivationStatus::Active
    }

    /// Short label used in logs and diagnostics.
    pub fn label(&self) -> String {
        format!(
            "{} ({} v{})",
            self.property_name, self.property_id, self.property_version
        )
    }
}

/// What a classified entry stands for.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Property,
    /// Placeholder for a map with no active properties.
    EmptyMap,
    /// Hostname resolution failed; the entry is kept with no hostnames.
    ResolveFailed,
}

/// A property placed in a partition, with its hostnames once enriched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedProperty {
    pub record: PropertyRecord,
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub kind: EntryKind,
}

impl ClassifiedProperty {
    pub fn new(record: PropertyRecord) -> Self {
        Self {
            record,
            hostnames: Vec::new(),
            kind: EntryKind::Property,
        }
    }

    /// Sentinel recording that `map` matched no active property.
    pub fn empty_marker(map: &str) -> Self {
        Self {
            record: PropertyRecord {
                property_id: String::new(),
                property_version: 0,
                property_name: format!("{EMPTY_MAP_MARKER} for {map}"),
                production_status: ActivationStatus::Other,
                staging_status: ActivationStatus::Other,
                contract_id: None,
                group_id: None,
            },
            hostnames: Vec::new(),
            kind: EntryKind::EmptyMap,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind == EntryKind::EmptyMap
    }

    /// Name as shown in the console and in exports.
    pub fn display_name(&self) -> String {
        match self.kind {
            EntryKind::Property => self.record.property_name.clone(),
            EntryKind::EmptyMap => EMPTY_MAP_MARKER.to_string(),
            EntryKind::ResolveFailed => {
                format!("{} {}", self.record.property_name, ERROR_MARKER)
            }
        }
    }

    pub fn joined_hostnames(&self) -> String {
        self.hostnames.join(",")
    }
}

/// Properties bound to one shield map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapBucket {
    pub shield_map: String,
    pub properties: Vec<ClassifiedProperty>,
}

impl MapBucket {
    pub fn new(shield_map: impl Into<String>, properties: Vec<ClassifiedProperty>) -> Self {
        let shield_map = shield_map.into();
        let properties = if properties.is_empty() {
            vec![ClassifiedProperty::empty_marker(&shield_map)]
        } else {
            properties
        };
        Self {
            shield_map,
            properties,
        }
    }

    pub fn is_empty_map(&self) -> bool {
        self.properties.iter().all(ClassifiedProperty::is_sentinel)
    }

    /// Entries that stand for a real property.
    pub fn real_properties(&self) -> impl Iterator<Item = &ClassifiedProperty> {
        self.properties.iter().filter(|p| !p.is_sentinel())
    }
}

/// Outcome of the classification and enrichment phases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditResult {
    pub protected: Vec<MapBucket>,
    pub unprotected: Vec<ClassifiedProperty>,
}
