//! Identity keys for property versions and membership sets over them.

use std::collections::HashSet;

use crate::model::{Environment, PropertyRecord};

/// Identity of a deployed property version.
///
/// Equality and hashing use both fields structurally, so no textual form of
/// either field can collide with another pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey {
    property_id: String,
    property_version: u32,
}

impl PropertyKey {
    pub fn new(property_id: impl Into<String>, property_version: u32) -> Self {
        Self {
            property_id: property_id.into(),
            property_version,
        }
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    pub fn property_version(&self) -> u32 {
        self.property_version
    }
}

impl From<&PropertyRecord> for PropertyKey {
    fn from(record: &PropertyRecord) -> Self {
        make_key(record)
    }
}

/// Key of a record.
pub fn make_key(record: &PropertyRecord) -> PropertyKey {
    PropertyKey::new(record.property_id.clone(), record.property_version)
}

/// Keys of every record active in `env`.
pub fn build_membership<'a, I>(records: I, env: Environment) -> HashSet<PropertyKey>
where
    I: IntoIterator<Item = &'a PropertyRecord>,
{
    records
        .into_iter()
        .filter(|r| r.is_active(env))
        .map(make_key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActivationStatus;

    fn record(id: &str, version: u32, prod: ActivationStatus) -> PropertyRecord {
        PropertyRecord {
            property_id: id.into(),
            property_version: version,
            property_name: format!("{id}-name"),
            production_status: prod,
            staging_status: ActivationStatus::Inactive,
            contract_id: None,
            group_id: None,
        }
    }

    #[test]
    fn test_key_is_deterministic() {
        let r = record("prp_1", 4, ActivationStatus::Active);
        assert_eq!(make_key(&r), make_key(&r.clone()));
        assert_eq!(make_key(&r), PropertyKey::new("prp_1", 4));
    }

    #[test]
    fn test_key_distinguishes_versions() {
        assert_ne!(PropertyKey::new("prp_1", 4), PropertyKey::new("prp_1", 5));
    }

    #[test]
    fn test_no_separator_collision() {
        // "a_1" + 2 and "a" + 12 would collide under naive concatenation
        // with "_" or no separator.
        assert_ne!(PropertyKey::new("a_1", 2), PropertyKey::new("a", 12));
        assert_ne!(PropertyKey::new("1", 23), PropertyKey::new("12", 3));
    }

    #[test]
    fn test_membership_filters_inactive() {
        let records = vec![
            record("prp_1", 1, ActivationStatus::Active),
            record("prp_2", 1, ActivationStatus::Inactive),
            record("prp_3", 2, ActivationStatus::Other),
            record("prp_1", 1, ActivationStatus::Active),
        ];
        let set = build_membership(&records, Environment::Production);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&PropertyKey::new("prp_1", 1)));

        let staging = build_membership(&records, Environment::Staging);
        assert!(staging.is_empty());
    }
}
