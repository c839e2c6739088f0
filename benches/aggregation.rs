//! Benchmarks for classification and stats aggregation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashSet;
use std::hint::black_box;

use shieldaudit::classifier::classify_unprotected;
use shieldaudit::enricher::dedup_hostnames;
use shieldaudit::keyset::{build_membership, PropertyKey};
use shieldaudit::model::{
    ActivationStatus, AuditResult, ClassifiedProperty, Environment, MapBucket, PropertyRecord,
};
use shieldaudit::stats::AuditStats;

fn record(i: usize) -> PropertyRecord {
    PropertyRecord {
        property_id: format!("prp_{}", i),
        property_version: (i % 7) as u32 + 1,
        property_name: format!("property-{}.example.com", i),
        production_status: if i % 10 == 0 {
            ActivationStatus::Inactive
        } else {
            ActivationStatus::Active
        },
        staging_status: ActivationStatus::Inactive,
        contract_id: Some("ctr_1".to_string()),
        group_id: Some("grp_1".to_string()),
    }
}

/// Properties with a few hostnames each, some shared between properties
fn generate_entries(count: usize) -> Vec<ClassifiedProperty> {
    (0..count)
        .map(|i| {
            let mut entry = ClassifiedProperty::new(record(i));
            entry.hostnames = (0..4)
                .map(|h| format!("h{}.example.com", (i * 3 + h) % (count * 2)))
                .collect();
            entry
        })
        .collect()
}

/// Spread entries over `maps` buckets, the last tenth left unprotected
fn generate_result(count: usize, maps: usize) -> AuditResult {
    let entries = generate_entries(count);
    let split = count - count / 10;
    let mut protected: Vec<Vec<ClassifiedProperty>> = vec![Vec::new(); maps];
    for (i, entry) in entries[..split].iter().enumerate() {
        protected[i % maps].push(entry.clone());
    }
    AuditResult {
        protected: protected
            .into_iter()
            .enumerate()
            .map(|(m, props)| MapBucket::new(format!("s{}.shield.net", m), props))
            .collect(),
        unprotected: entries[split..].to_vec(),
    }
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    for size in [100, 1000, 10000, 50000] {
        let result = generate_result(size, 20);
        group.bench_with_input(BenchmarkId::new("compute", size), &result, |b, result| {
            b.iter(|| black_box(AuditStats::compute(result)));
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_unprotected");

    for size in [1000, 10000, 50000] {
        let universe: Vec<PropertyRecord> = (0..size).map(record).collect();
        let protected: HashSet<PropertyKey> =
            build_membership(universe.iter().step_by(3), Environment::Production);

        group.bench_with_input(
            BenchmarkId::new("residual", size),
            &universe,
            |b, universe| {
                b.iter(|| {
                    black_box(classify_unprotected(
                        &protected,
                        universe.clone(),
                        Environment::Production,
                    ))
                });
            },
        );
    }

    group.finish();
}

fn bench_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup_hostnames");

    for size in [100, 1000, 10000] {
        // Create list with duplicates
        let mut hosts: Vec<String> = (0..size).map(|i| format!("h{}.example.com", i)).collect();
        hosts.extend(hosts.clone());

        group.bench_with_input(
            BenchmarkId::new("with_duplicates", size * 2),
            &hosts,
            |b, hosts| {
                b.iter(|| black_box(dedup_hostnames(hosts.iter().cloned())));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_stats, bench_classify, bench_dedup);
criterion_main!(benches);
