//! Audit run pipeline.
//!
//! Phases run strictly in order:
//! discover maps, classify maps, fetch universe, classify unprotected,
//! enrich protected, enrich unprotected, compute stats.
//! Only the two enrichment phases run concurrently internally.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{HostnameResolver, Predicate, PropertySearch};
use crate::assembler::AuditMode;
use crate::classifier::{
    classify_maps, classify_unprotected, discover_maps, fetch_universe, protected_keys,
    uncovered_shielded,
};
use crate::config::DEFAULT_UNIVERSE_BEHAVIOR;
use crate::diagnostics::{Diagnostics, ErrorContext};
use crate::enricher::{EnrichFailure, HostnameEnricher, DEFAULT_WORKERS};
use crate::error::AuditError;
use crate::model::{AuditResult, ClassifiedProperty, Environment, MapBucket};
use crate::stats::AuditStats;

/// What to audit
#[derive(Debug, Clone, Default)]
pub struct AuditRequest {
    /// Restrict the run to a single shield map
    pub map: Option<String>,
    pub mode: AuditMode,
}

impl AuditRequest {
    /// Single-map scope never computes the unprotected partition
    pub fn is_single_map(&self) -> bool {
        self.map.is_some()
    }
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct AuditOutcome {
    pub result: AuditResult,
    pub stats: AuditStats,
    pub diagnostics: Diagnostics,
    pub mode: AuditMode,
    pub environment: Environment,
}

/// Runs audits against a pair of collaborators
pub struct Auditor {
    search: Arc<dyn PropertySearch>,
    resolver: Arc<dyn HostnameResolver>,
    workers: usize,
    environment: Environment,
    universe_behavior: String,
}

impl Auditor {
    pub fn new(search: Arc<dyn PropertySearch>, resolver: Arc<dyn HostnameResolver>) -> Self {
        Self {
            search,
            resolver,
            workers: DEFAULT_WORKERS,
            environment: Environment::default(),
            universe_behavior: DEFAULT_UNIVERSE_BEHAVIOR.to_string(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_universe_behavior(mut self, behavior: impl Into<String>) -> Self {
        self.universe_behavior = behavior.into();
        self
    }

    /// Run one audit.
    ///
    /// Map discovery and universe failures abort with an error. Failures
    /// scoped to one map or one property are collected in the outcome's
    /// diagnostics and the run continues.
    pub async fn run(&self, request: &AuditRequest) -> Result<AuditOutcome, AuditError> {
        let env = self.environment;
        let mut diagnostics = Diagnostics::new();

        let maps = match &request.map {
            Some(map) => vec![map.clone()],
            None => discover_maps(self.search.as_ref()).await?,
        };

        info!("Classifying {} shield maps ({})", maps.len(), env);
        let mut protected = classify_maps(self.search.as_ref(), &maps, env, &mut diagnostics).await;

        let mut unprotected = if request.is_single_map() {
            debug!("Single map scope, skipping unprotected partition");
            Vec::new()
        } else {
            self.check_coverage(&protected).await;
            let keys = protected_keys(&protected, env);
            info!("Fetching properties with behavior {}", self.universe_behavior);
            let universe = fetch_universe(self.search.as_ref(), &self.universe_behavior).await?;
            let unprotected = classify_unprotected(&keys, universe, env);
            info!(
                "{} protected, {} unprotected active properties",
                keys.len(),
                unprotected.len()
            );
            unprotected
        };

        let enricher = HostnameEnricher::new(Arc::clone(&self.resolver)).with_workers(self.workers);

        info!("Resolving hostnames for protected properties");
        enrich_protected(&enricher, &mut protected, &mut diagnostics).await;

        if !unprotected.is_empty() {
            info!("Resolving hostnames for unprotected properties");
            enrich_unprotected(&enricher, &mut unprotected, &mut diagnostics).await;
        }

        let result = AuditResult {
            protected,
            unprotected,
        };
        let stats = AuditStats::compute(&result);

        Ok(AuditOutcome {
            result,
            stats,
            diagnostics,
            mode: request.mode,
            environment: env,
        })
    }

    /// Warn about active shielded properties whose map was not discovered.
    ///
    /// Those land in the unprotected partition. The check never fails the run.
    async fn check_coverage(&self, buckets: &[MapBucket]) {
        match self.search.search(&Predicate::AnyShieldBehavior).await {
            Ok(shielded) => {
                let missing = uncovered_shielded(buckets, shielded, self.environment);
                if !missing.is_empty() {
                    warn!(
                        "{} active shielded properties reference no discovered map",
                        missing.len()
                    );
                    for record in &missing {
                        debug!("Not covered by any map: {}", record.label());
                    }
                }
            }
            Err(e) => warn!("Shield coverage check failed: {}", e),
        }
    }
}

async fn enrich_protected(
    enricher: &HostnameEnricher,
    buckets: &mut [MapBucket],
    diagnostics: &mut Diagnostics,
) {
    let batch: Vec<((usize, usize), ClassifiedProperty)> = buckets
        .iter_mut()
        .enumerate()
        .flat_map(|(b, bucket)| {
            std::mem::take(&mut bucket.properties)
                .into_iter()
                .enumerate()
                .map(move |(i, entry)| ((b, i), entry))
        })
        .collect();

    let mut outcome = enricher.enrich(batch).await;
    record_failures(&outcome.failures, diagnostics);

    // Restore discovery and search order
    outcome.items.sort_by_key(|(tag, _)| *tag);
    for ((b, _), entry) in outcome.items {
        if let Some(bucket) = buckets.get_mut(b) {
            bucket.properties.push(entry);
        }
    }
}

async fn enrich_unprotected(
    enricher: &HostnameEnricher,
    entries: &mut Vec<ClassifiedProperty>,
    diagnostics: &mut Diagnostics,
) {
    let batch: Vec<(usize, ClassifiedProperty)> =
        std::mem::take(entries).into_iter().enumerate().collect();

    let mut outcome = enricher.enrich(batch).await;
    record_failures(&outcome.failures, diagnostics);

    outcome.items.sort_by_key(|(tag, _)| *tag);
    entries.extend(outcome.items.into_iter().map(|(_, entry)| entry));
}

fn record_failures(failures: &[EnrichFailure], diagnostics: &mut Diagnostics) {
    for failure in failures {
        diagnostics.record(
            ErrorContext::HostnameResolve(failure.property.clone()),
            &failure.message,
        );
    }
}
