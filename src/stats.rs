//! Property and hostname statistics derived from an [`AuditResult`].
//!
//! Stats are never stored: they are recomputed from the result, so the
//! console summary and every export agree.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::{AuditResult, ClassifiedProperty, MapBucket};

/// Counts for one shield map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapStats {
    pub shield_map: String,
    pub property_count: usize,
    pub hostname_count: usize,
}

/// Counts for the whole audit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditStats {
    pub maps: Vec<MapStats>,
    pub protected_properties: usize,
    pub protected_hostnames: usize,
    pub unprotected_properties: usize,
    pub unprotected_hostnames: usize,
    pub total_properties: usize,
    pub total_hostnames: usize,
    /// Percentage of active properties that are protected
    pub protection_rate: f64,
}

impl AuditStats {
    /// Compute every count from the result
    pub fn compute(result: &AuditResult) -> Self {
        let maps: Vec<MapStats> = result.protected.iter().map(map_stats).collect();

        let protected_entries = result.protected.iter().flat_map(MapBucket::real_properties);
        let (protected_properties, protected_hostnames) = count_entries(protected_entries);
        let (unprotected_properties, unprotected_hostnames) =
            count_entries(result.unprotected.iter());
        let (_, total_hostnames) = count_entries(
            result
                .protected
                .iter()
                .flat_map(MapBucket::real_properties)
                .chain(result.unprotected.iter()),
        );

        Self {
            maps,
            protected_properties,
            protected_hostnames,
            unprotected_properties,
            unprotected_hostnames,
            total_properties: protected_properties + unprotected_properties,
            total_hostnames,
            protection_rate: protection_rate(protected_properties, unprotected_properties),
        }
    }
}

fn map_stats(bucket: &MapBucket) -> MapStats {
    let (property_count, hostname_count) = count_entries(bucket.real_properties());
    MapStats {
        shield_map: bucket.shield_map.clone(),
        property_count,
        hostname_count,
    }
}

/// Non-sentinel entries and the size of their deduplicated hostname union
pub fn count_entries<'a, I>(entries: I) -> (usize, usize)
where
    I: IntoIterator<Item = &'a ClassifiedProperty>,
{
    let mut properties = 0;
    let mut hostnames: HashSet<&str> = HashSet::new();

    for entry in entries.into_iter().filter(|e| !e.is_sentinel()) {
        properties += 1;
        hostnames.extend(entry.hostnames.iter().map(String::as_str));
    }

    (properties, hostnames.len())
}

/// Protected share as a percentage rounded to 2 decimals, 0 when there is
/// nothing to audit.
pub fn protection_rate(protected: usize, unprotected: usize) -> f64 {
    let total = protected + unprotected;
    if total == 0 {
        return 0.0;
    }
    let rate = protected as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivationStatus, EntryKind, PropertyRecord};

    fn entry(id: &str, hosts: &[&str]) -> ClassifiedProperty {
        ClassifiedProperty {
            record: PropertyRecord {
                property_id: id.into(),
                property_version: 1,
                property_name: id.into(),
                production_status: ActivationStatus::Active,
                staging_status: ActivationStatus::Inactive,
                contract_id: None,
                group_id: None,
            },
            hostnames: hosts.iter().map(|h| h.to_string()).collect(),
            kind: EntryKind::Property,
        }
    }

    #[test]
    fn test_protection_rate() {
        assert_eq!(protection_rate(0, 0), 0.0);
        assert_eq!(protection_rate(45, 5), 90.0);
        assert_eq!(protection_rate(1, 2), 33.33);
        assert_eq!(protection_rate(2, 1), 66.67);
        assert_eq!(protection_rate(3, 0), 100.0);
    }

    #[test]
    fn test_duplicate_hostnames_count_once() {
        let with_dupes = vec![entry("p", &["a", "b", "a"])];
        let without = vec![entry("p", &["b", "a"])];
        assert_eq!(count_entries(&with_dupes), (1, 2));
        assert_eq!(count_entries(&without), (1, 2));
    }

    #[test]
    fn test_hostnames_shared_across_properties_count_once() {
        let entries = vec![entry("p1", &["a", "b"]), entry("p2", &["b", "c"])];
        assert_eq!(count_entries(&entries), (2, 3));
    }

    #[test]
    fn test_empty_map_contributes_nothing() {
        let result = AuditResult {
            protected: vec![
                MapBucket::new("a.net", vec![entry("p1", &["x"])]),
                MapBucket::new("b.net", vec![]),
            ],
            unprotected: vec![],
        };
        let stats = AuditStats::compute(&result);
        assert_eq!(stats.maps.len(), 2);
        assert_eq!(stats.maps[1].property_count, 0);
        assert_eq!(stats.maps[1].hostname_count, 0);
        assert_eq!(stats.protected_properties, 1);
        assert_eq!(stats.protected_hostnames, 1);
        assert_eq!(stats.protection_rate, 100.0);
    }

    #[test]
    fn test_hostname_in_both_partitions_counts_once_in_total() {
        let result = AuditResult {
            protected: vec![MapBucket::new(
                "a.net",
                vec![entry("p1", &["www.example.com", "api.example.com"])],
            )],
            unprotected: vec![entry("p2", &["www.example.com"])],
        };
        let stats = AuditStats::compute(&result);
        assert_eq!(stats.protected_hostnames, 2);
        assert_eq!(stats.unprotected_hostnames, 1);
        assert_eq!(stats.total_hostnames, 2);
        assert_eq!(stats.total_properties, 2);
    }

    #[test]
    fn test_failed_entry_counts_as_property_without_hostnames() {
        let mut failed = entry("p2", &[]);
        failed.kind = EntryKind::ResolveFailed;
        let result = AuditResult {
            protected: vec![],
            unprotected: vec![entry("p1", &["a"]), failed],
        };
        let stats = AuditStats::compute(&result);
        assert_eq!(stats.unprotected_properties, 2);
        assert_eq!(stats.unprotected_hostnames, 1);
        assert_eq!(stats.protection_rate, 0.0);
    }

    #[test]
    fn test_stats_survive_serialization() {
        let result = AuditResult {
            protected: vec![MapBucket::new(
                "a.net",
                vec![entry("p1", &["a", "b"]), entry("p2", &["b"])],
            )],
            unprotected: vec![entry("p3", &["c", "c"])],
        };
        let json = serde_json::to_string(&result).unwrap();
        let restored: AuditResult = serde_json::from_str(&json).unwrap();
        assert_eq!(AuditStats::compute(&restored), AuditStats::compute(&result));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::{ActivationStatus, EntryKind, PropertyRecord};
    use proptest::prelude::*;

    fn hostnames_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-e]\\.example\\.com", 0..12)
    }

    fn entry(hostnames: Vec<String>) -> ClassifiedProperty {
        ClassifiedProperty {
            record: PropertyRecord {
                property_id: "prp_1".into(),
                property_version: 1,
                property_name: "p".into(),
                production_status: ActivationStatus::Active,
                staging_status: ActivationStatus::Inactive,
                contract_id: None,
                group_id: None,
            },
            hostnames,
            kind: EntryKind::Property,
        }
    }

    proptest! {
        /// Hostname counts ignore order and duplicates
        #[test]
        fn prop_count_is_order_and_duplicate_insensitive(hosts in hostnames_strategy()) {
            let mut reversed = hosts.clone();
            reversed.reverse();
            let mut doubled = hosts.clone();
            doubled.extend(hosts.iter().cloned());

            let base = count_entries(&[entry(hosts.clone())]);
            prop_assert_eq!(base, count_entries(&[entry(reversed)]));
            prop_assert_eq!(base, count_entries(&[entry(doubled)]));

            let unique: HashSet<_> = hosts.iter().collect();
            prop_assert_eq!(base.1, unique.len());
        }

        /// Protection rate stays within 0..=100
        #[test]
        fn prop_protection_rate_bounded(p in 0usize..10_000, u in 0usize..10_000) {
            let rate = protection_rate(p, u);
            prop_assert!((0.0..=100.0).contains(&rate));
        }
    }
}
