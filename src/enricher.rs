//! Bounded worker pool attaching hostnames to classified properties.
//!
//! A fixed number of workers pull jobs from a shared queue, call the
//! resolver, and push results to a channel. Completion order is arbitrary;
//! every job carries a caller-chosen tag so results can be placed back.

use futures::future::join_all;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::HostnameResolver;
use crate::model::{ClassifiedProperty, EntryKind};

/// Concurrent hostname lookups per batch unless configured otherwise
pub const DEFAULT_WORKERS: usize = 4;

/// A property whose hostnames could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichFailure {
    pub property: String,
    pub message: String,
}

/// Result of enriching one batch
#[derive(Debug)]
pub struct EnrichOutcome<T> {
    /// Every input entry, in completion order
    pub items: Vec<(T, ClassifiedProperty)>,
    pub failures: Vec<EnrichFailure>,
}

struct WorkerResult<T> {
    tag: T,
    entry: ClassifiedProperty,
    failure: Option<String>,
}

/// Hostname enrichment with a bounded number of in-flight lookups
pub struct HostnameEnricher {
    resolver: Arc<dyn HostnameResolver>,
    workers: usize,
    completed: Arc<AtomicUsize>,
}

impl HostnameEnricher {
    pub fn new(resolver: Arc<dyn HostnameResolver>) -> Self {
        Self {
            resolver,
            workers: DEFAULT_WORKERS,
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the pool width (at least 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Lookups finished in the current or last batch
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Resolve hostnames for every entry of `batch`.
    ///
    /// A failed lookup keeps the entry with no hostnames and marks it
    /// `ResolveFailed`; the batch never shrinks. Sentinel entries pass
    /// through untouched.
    pub async fn enrich<T>(&self, batch: Vec<(T, ClassifiedProperty)>) -> EnrichOutcome<T>
    where
        T: Send + 'static,
    {
        self.completed.store(0, Ordering::Relaxed);

        let (mut items, jobs): (Vec<_>, Vec<_>) =
            batch.into_iter().partition(|(_, entry)| entry.is_sentinel());

        let total = jobs.len();
        if total == 0 {
            return EnrichOutcome {
                items,
                failures: Vec::new(),
            };
        }

        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let width = self.workers.min(total);
        debug!("Resolving hostnames for {} properties with {} workers", total, width);

        let handles: Vec<_> = (0..width)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let resolver = Arc::clone(&self.resolver);
                let completed = Arc::clone(&self.completed);
                let tx = tx.clone();

                tokio::spawn(async move {
                    loop {
                        let job = queue
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .pop_front();
                        let Some((tag, mut entry)) = job else { break };

                        let failure = match resolver.resolve(&entry.record).await {
                            Ok(hostnames) => {
                                entry.hostnames = dedup_hostnames(hostnames);
                                None
                            }
                            Err(e) => {
                                entry.hostnames.clear();
                                entry.kind = EntryKind::ResolveFailed;
                                Some(e.to_string())
                            }
                        };

                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!("Hostnames {}/{}: {}", done, total, entry.record.label());

                        if tx.send(WorkerResult { tag, entry, failure }).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(tx);

        let mut failures = Vec::new();
        while let Some(result) = rx.recv().await {
            if let Some(message) = result.failure {
                warn!(
                    "Failed to resolve hostnames for {}: {}",
                    result.entry.record.label(),
                    message
                );
                failures.push(EnrichFailure {
                    property: result.entry.record.label(),
                    message,
                });
            }
            items.push((result.tag, result.entry));
        }

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!("Hostname worker aborted: {}", e);
            }
        }

        EnrichOutcome { items, failures }
    }
}

/// Trim, drop blanks and remove duplicates, keeping first appearance.
pub fn dedup_hostnames<I: IntoIterator<Item = String>>(hostnames: I) -> Vec<String> {
    let mut seen = HashSet::new();
    hostnames
        .into_iter()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty() && seen.insert(h.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHostnameResolver;
    use crate::error::ResolveError;
    use crate::model::{ActivationStatus, PropertyRecord};
    use async_trait::async_trait;
    use std::time::Duration;

    fn entry(id: &str) -> ClassifiedProperty {
        ClassifiedProperty::new(PropertyRecord {
            property_id: id.into(),
            property_version: 1,
            property_name: format!("{id}.example.com"),
            production_status: ActivationStatus::Active,
            staging_status: ActivationStatus::Inactive,
            contract_id: Some("ctr_1".into()),
            group_id: Some("grp_1".into()),
        })
    }

    #[test]
    fn test_dedup_hostnames() {
        let hosts = vec!["a".to_string(), "b".to_string(), "a".to_string(), " ".to_string()];
        assert_eq!(dedup_hostnames(hosts), vec!["a", "b"]);
    }

    #[test]
    fn test_with_workers_clamps_zero() {
        let enricher = HostnameEnricher::new(Arc::new(MockHostnameResolver::new())).with_workers(0);
        assert_eq!(enricher.workers(), 1);
        let default = HostnameEnricher::new(Arc::new(MockHostnameResolver::new()));
        assert_eq!(default.workers(), DEFAULT_WORKERS);
    }

    #[tokio::test]
    async fn test_enrich_dedups_hostnames() {
        let mut resolver = MockHostnameResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Ok(vec!["a.example.com".into(), "b.example.com".into(), "a.example.com".into()]));
        let enricher = HostnameEnricher::new(Arc::new(resolver));

        let outcome = enricher.enrich(vec![(0usize, entry("prp_1"))]).await;
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].1.hostnames, vec!["a.example.com", "b.example.com"]);
        assert_eq!(enricher.completed(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_batch_size() {
        let mut resolver = MockHostnameResolver::new();
        resolver.expect_resolve().returning(|record| {
            if record.property_id == "prp_2" {
                Err(ResolveError::Http {
                    property: record.label(),
                    status: 500,
                })
            } else {
                Ok(vec![format!("{}.example.com", record.property_id)])
            }
        });
        let enricher = HostnameEnricher::new(Arc::new(resolver));

        let batch: Vec<_> = (1..=5).map(|i| (i, entry(&format!("prp_{i}")))).collect();
        let outcome = enricher.enrich(batch).await;

        assert_eq!(outcome.items.len(), 5);
        assert_eq!(outcome.failures.len(), 1);
        let (_, failed) = outcome.items.iter().find(|(tag, _)| *tag == 2).unwrap();
        assert_eq!(failed.kind, EntryKind::ResolveFailed);
        assert!(failed.hostnames.is_empty());
        assert!(failed.display_name().ends_with("[ERROR]"));
    }

    #[tokio::test]
    async fn test_sentinel_is_not_resolved() {
        let mut resolver = MockHostnameResolver::new();
        resolver.expect_resolve().times(0);
        let enricher = HostnameEnricher::new(Arc::new(resolver));

        let outcome = enricher
            .enrich(vec![((), ClassifiedProperty::empty_marker("s1.net"))])
            .await;
        assert_eq!(outcome.items.len(), 1);
        assert!(outcome.items[0].1.is_sentinel());
    }

    struct SlowResolver {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl HostnameResolver for SlowResolver {
        async fn resolve(&self, record: &PropertyRecord) -> Result<Vec<String>, ResolveError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![record.property_name.clone()])
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let resolver = Arc::new(SlowResolver {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        let enricher = HostnameEnricher::new(resolver.clone()).with_workers(2);

        let batch: Vec<_> = (0..12).map(|i| (i, entry(&format!("prp_{i}")))).collect();
        let outcome = enricher.enrich(batch).await;

        assert_eq!(outcome.items.len(), 12);
        assert_eq!(enricher.completed(), 12);
        let max = resolver.max_in_flight.load(Ordering::SeqCst);
        assert!(max >= 1 && max <= 2, "max in flight was {}", max);
    }
}
