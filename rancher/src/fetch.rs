//! # Fetch Orchestration
//!
//! Downloads the kubeconfig of every active cluster with bounded
//! concurrency. A failing or slow cluster becomes a [`FetchFailure`] and the
//! rest of the batch carries on.

use crate::client::{Cluster, ClusterSource};
use crate::error::{RancherError, RancherResult};
use chrono::{DateTime, Utc};
use config::ProxyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub cluster: String,
    pub reason: String
}

/// Result of one batch of downloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Raw kubeconfig text keyed by cluster name.
    pub kubeconfigs: BTreeMap<String, String>,
    /// Clusters left out because they are not active.
    pub skipped: Vec<String>,
    pub failures: Vec<FetchFailure>
}

impl FetchReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            ..Default::default()
        }
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn add_failure(&mut self, cluster: &str, reason: impl ToString) {
        self.failures.push(FetchFailure {
            cluster: cluster.to_string(),
            reason: reason.to_string()
        });
    }
}

enum Outcome {
    Fetched(String),
    Failed(RancherError),
    NotStarted
}

pub struct FetchOrchestrator {
    source: Arc<dyn ClusterSource>,
    concurrency: usize,
    timeout: Duration
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn ClusterSource>, concurrency: usize, timeout: Duration) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
            timeout
        }
    }

    pub fn from_config(source: Arc<dyn ClusterSource>, config: &ProxyConfig) -> Self {
        Self::new(source, config.fetch.concurrency, config.fetch.timeout())
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch the kubeconfig of every active cluster in `clusters`.
    ///
    /// Once `cancel` fires no new download starts. Downloads already running
    /// finish (or time out) and the call returns [`RancherError::Cancelled`].
    pub async fn fetch_all(
        &self,
        clusters: Vec<Cluster>,
        cancel: &CancellationToken
    ) -> RancherResult<FetchReport> {
        let mut report = FetchReport::new();

        let (active, inactive): (Vec<_>, Vec<_>) =
            clusters.into_iter().partition(Cluster::is_active);
        for cluster in inactive {
            debug!(cluster = %cluster.name, state = %cluster.state, "Skipping inactive cluster");
            report.skipped.push(cluster.name);
        }

        if active.is_empty() {
            if cancel.is_cancelled() {
                return Err(RancherError::Cancelled);
            }
            report.complete();
            return Ok(report);
        }

        let permits = self.concurrency.min(active.len());
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();
        let mut pending = Vec::with_capacity(active.len());

        info!(
            clusters = active.len(),
            concurrency = permits,
            "Fetching kubeconfigs"
        );

        for cluster in active {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let timeout = self.timeout;
            pending.push(cluster.name.clone());

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    () = cancel.cancelled() => return (cluster.name, Outcome::NotStarted),
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (cluster.name, Outcome::NotStarted)
                    }
                };
                if cancel.is_cancelled() {
                    return (cluster.name, Outcome::NotStarted);
                }

                let fetch = source.get_cluster_kubeconfig(&cluster);
                let outcome = match tokio::time::timeout(timeout, fetch).await {
                    Ok(Ok(text)) => Outcome::Fetched(text),
                    Ok(Err(e)) => Outcome::Failed(e),
                    Err(_) => Outcome::Failed(RancherError::Timeout {
                        seconds: timeout.as_secs()
                    })
                };
                (cluster.name, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (name, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!(error = %e, "Fetch task aborted");
                    continue;
                }
            };
            if let Some(index) = pending.iter().position(|p| *p == name) {
                pending.swap_remove(index);
            }

            match outcome {
                Outcome::Fetched(text) => {
                    debug!(cluster = %name, bytes = text.len(), "Fetched kubeconfig");
                    if report.kubeconfigs.insert(name.clone(), text).is_some() {
                        warn!(cluster = %name, "Several clusters share this name; keeping the last one fetched");
                    }
                }
                Outcome::Failed(e) => {
                    warn!(cluster = %name, error = %e, "Failed to fetch kubeconfig");
                    report.add_failure(&name, e);
                }
                Outcome::NotStarted => {}
            }
        }

        if cancel.is_cancelled() {
            info!("Kubeconfig fetch cancelled");
            return Err(RancherError::Cancelled);
        }

        // Whatever never reported back panicked.
        for name in pending {
            report.add_failure(&name, "fetch task aborted");
        }

        report.failures.sort_by(|a, b| a.cluster.cmp(&b.cluster));
        report.complete();

        info!(
            fetched = report.kubeconfigs.len(),
            failed = report.failures.len(),
            skipped = report.skipped.len(),
            "Kubeconfig fetch completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source. Clusters named `fail-*` error out, `slow-*` sleep
    /// for `delay`.
    struct FakeSource {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize
    }

    impl FakeSource {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0)
            })
        }
    }

    #[async_trait]
    impl ClusterSource for FakeSource {
        async fn list_clusters(&self) -> RancherResult<Vec<Cluster>> {
            Ok(Vec::new())
        }

        async fn get_cluster_kubeconfig(&self, cluster: &Cluster) -> RancherResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if cluster.name.starts_with("slow-") {
                tokio::time::sleep(self.delay).await;
            } else {
                tokio::task::yield_now().await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if cluster.name.starts_with("fail-") {
                return Err(RancherError::ApiError {
                    status: 500,
                    message: "boom".to_string()
                });
            }
            Ok(format!("kubeconfig for {}", cluster.name))
        }
    }

    fn active(name: &str) -> Cluster {
        Cluster::new(&format!("c-{name}"), name, "active")
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_going() {
        let source = FakeSource::new(Duration::ZERO);
        let orchestrator = FetchOrchestrator::new(source, 4, Duration::from_secs(5));

        let report = orchestrator
            .fetch_all(
                vec![active("a"), active("fail-b"), active("c")],
                &CancellationToken::new()
            )
            .await
            .unwrap();

        assert_eq!(
            report.kubeconfigs.keys().collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].cluster, "fail-b");
        assert!(report.failures[0].reason.contains("500"));
        assert!(report.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_inactive_clusters_are_skipped() {
        let source = FakeSource::new(Duration::ZERO);
        let orchestrator = FetchOrchestrator::new(source.clone(), 4, Duration::from_secs(5));

        let report = orchestrator
            .fetch_all(
                vec![
                    active("a"),
                    Cluster::new("c-b", "b", "provisioning"),
                    Cluster::new("c-c", "c", "unavailable"),
                ],
                &CancellationToken::new()
            )
            .await
            .unwrap();

        assert_eq!(report.skipped, vec!["b", "c"]);
        assert_eq!(report.kubeconfigs.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out() {
        let source = FakeSource::new(Duration::from_secs(10));
        let orchestrator = FetchOrchestrator::new(source, 4, Duration::from_millis(50));

        let report = orchestrator
            .fetch_all(vec![active("a"), active("slow-b")], &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.kubeconfigs.contains_key("a"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].cluster, "slow-b");
        assert!(report.failures[0].reason.contains("timed out"));
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let source = FakeSource::new(Duration::from_millis(20));
        let orchestrator = FetchOrchestrator::new(source.clone(), 2, Duration::from_secs(5));

        let clusters = (0..6).map(|i| active(&format!("slow-{i}"))).collect();
        let report = orchestrator
            .fetch_all(clusters, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.kubeconfigs.len(), 6);
        assert!(source.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let source = FakeSource::new(Duration::ZERO);
        let orchestrator = FetchOrchestrator::new(source.clone(), 2, Duration::from_secs(5));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = orchestrator
            .fetch_all(vec![active("a"), active("b")], &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, RancherError::Cancelled));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_queued_fetches() {
        let source = FakeSource::new(Duration::from_millis(100));
        let orchestrator = FetchOrchestrator::new(source.clone(), 1, Duration::from_secs(5));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let clusters = (0..5).map(|i| active(&format!("slow-{i}"))).collect();
        let err = orchestrator.fetch_all(clusters, &cancel).await.unwrap_err();

        assert!(matches!(err, RancherError::Cancelled));
        assert!(source.calls.load(Ordering::SeqCst) < 5);
    }

    #[tokio::test]
    async fn test_no_active_clusters() {
        let orchestrator =
            FetchOrchestrator::new(FakeSource::new(Duration::ZERO), 0, Duration::from_secs(1));
        assert_eq!(orchestrator.concurrency(), 1);

        let report = orchestrator
            .fetch_all(Vec::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(report.kubeconfigs.is_empty());
        assert!(!report.has_failures());
    }
}
