//! Partition active properties into per-map protected buckets and the
//! unprotected remainder.
//!
//! Classification is sequential and deterministic: buckets follow map
//! discovery order and entries follow search result order.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::api::{Predicate, PropertySearch};
use crate::diagnostics::{Diagnostics, ErrorContext};
use crate::error::AuditError;
use crate::keyset::{build_membership, make_key, PropertyKey};
use crate::model::{ClassifiedProperty, Environment, MapBucket, PropertyRecord};

/// Discover every shield map name, in first-seen order.
///
/// Failure is fatal: without a map list there is nothing to audit.
pub async fn discover_maps(search: &dyn PropertySearch) -> Result<Vec<String>, AuditError> {
    let names = search
        .shield_map_names()
        .await
        .map_err(AuditError::Discovery)?;
    let maps = distinct_names(names);
    info!("Discovered {} shield maps", maps.len());
    Ok(maps)
}

/// Trim, drop blanks and de-duplicate while keeping first appearance.
pub fn distinct_names<I: IntoIterator<Item = String>>(names: I) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .collect()
}

/// Build one bucket per map, querying maps one after another.
///
/// A failed map query is recorded in `diagnostics` and the map is skipped.
pub async fn classify_maps(
    search: &dyn PropertySearch,
    maps: &[String],
    env: Environment,
    diagnostics: &mut Diagnostics,
) -> Vec<MapBucket> {
    let mut claimed = HashSet::new();
    let mut buckets = Vec::with_capacity(maps.len());

    for map in maps {
        match search.search(&Predicate::ShieldMap(map.clone())).await {
            Ok(records) => {
                let bucket = bucket_for(map, records, env, &mut claimed);
                info!(
                    "{} - {} active properties",
                    map,
                    bucket.real_properties().count()
                );
                buckets.push(bucket);
            }
            Err(e) => {
                warn!("Failed to search properties for map {}: {}", map, e);
                diagnostics.record(ErrorContext::MapSearch(map.clone()), &e);
            }
        }
    }

    buckets
}

/// Bucket for `map` from its raw search result.
///
/// Keys already in `claimed` belong to an earlier map and are skipped, so a
/// property lands in at most one bucket.
pub fn bucket_for(
    map: &str,
    records: Vec<PropertyRecord>,
    env: Environment,
    claimed: &mut HashSet<PropertyKey>,
) -> MapBucket {
    let properties = records
        .into_iter()
        .filter(|r| r.is_active(env))
        .filter(|r| {
            let fresh = claimed.insert(make_key(r));
            if !fresh {
                debug!("{} already classified, skipping for {}", r.label(), map);
            }
            fresh
        })
        .map(ClassifiedProperty::new)
        .collect();

    MapBucket::new(map, properties)
}

/// Keys of every real property held by the buckets that is active in `env`.
pub fn protected_keys(buckets: &[MapBucket], env: Environment) -> HashSet<PropertyKey> {
    build_membership(
        buckets
            .iter()
            .flat_map(MapBucket::real_properties)
            .map(|p| &p.record),
        env,
    )
}

/// Active shielded records that no bucket holds, first appearance kept.
///
/// These reference a map the discovery listing did not return.
pub fn uncovered_shielded(
    buckets: &[MapBucket],
    shielded: Vec<PropertyRecord>,
    env: Environment,
) -> Vec<PropertyRecord> {
    let covered = protected_keys(buckets, env);
    let mut seen = HashSet::new();
    shielded
        .into_iter()
        .filter(|r| r.is_active(env))
        .filter(|r| {
            let key = make_key(r);
            !covered.contains(&key) && seen.insert(key)
        })
        .collect()
}

/// Fetch the universe of addressable properties.
///
/// Failure is fatal: the unprotected partition cannot be computed without it.
pub async fn fetch_universe(
    search: &dyn PropertySearch,
    behavior: &str,
) -> Result<Vec<PropertyRecord>, AuditError> {
    let predicate = Predicate::Universe {
        behavior: behavior.to_string(),
    };
    search.search(&predicate).await.map_err(AuditError::Universe)
}

/// Active universe records whose key is not protected.
pub fn classify_unprotected(
    protected: &HashSet<PropertyKey>,
    universe: Vec<PropertyRecord>,
    env: Environment,
) -> Vec<ClassifiedProperty> {
    let mut seen = HashSet::new();
    universe
        .into_iter()
        .filter(|r| r.is_active(env))
        .filter(|r| {
            let key = make_key(r);
            !protected.contains(&key) && seen.insert(key)
        })
        .map(ClassifiedProperty::new)
        .collect()
}
