use crate::client::{Cluster, ClusterSource, create_rancher_client};
use crate::error::{RancherError, RancherResult};
use crate::fetch::FetchOrchestrator;
use config::ProxyConfig;
use kubeconfig::{GeneratedKubeconfig, Generator};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Lists Rancher clusters and turns their kubeconfigs into one.
pub struct KubeconfigProxy {
    source: Arc<dyn ClusterSource>,
    generator: Generator,
    fetcher: FetchOrchestrator
}

impl KubeconfigProxy {
    pub fn new(source: Arc<dyn ClusterSource>, generator: Generator, fetcher: FetchOrchestrator) -> Self {
        Self {
            source,
            generator,
            fetcher
        }
    }

    pub fn from_config(config: &ProxyConfig) -> RancherResult<Self> {
        let source = create_rancher_client(config)?;
        let fetcher = FetchOrchestrator::from_config(Arc::clone(&source), config);
        Ok(Self::new(
            source,
            Generator::new(config.cluster_prefix.clone()),
            fetcher
        ))
    }

    pub async fn list_clusters(&self) -> RancherResult<Vec<Cluster>> {
        let clusters = self.source.list_clusters().await?;
        info!(count = clusters.len(), "Fetched clusters from Rancher");
        Ok(clusters)
    }

    /// Build the merged kubeconfig.
    ///
    /// `selection` restricts the run to clusters matching by id or name; an
    /// empty selection means every cluster. A selector that matches nothing
    /// is reported as a fetch warning.
    pub async fn generate(
        &self,
        selection: &[String],
        cancel: &CancellationToken
    ) -> RancherResult<GeneratedKubeconfig> {
        let clusters = self.list_clusters().await?;
        let (clusters, unknown) = select(clusters, selection);

        let fetched = self.fetcher.fetch_all(clusters, cancel).await?;
        let (document, mut report) = self.generator.merge(&fetched.kubeconfigs);

        for selector in unknown {
            warn!(cluster = %selector, "Selected cluster does not exist");
            report.record_fetch_failure(selector.clone(), RancherError::ClusterNotFound(selector));
        }
        for failure in fetched.failures {
            report.record_fetch_failure(failure.cluster, failure.reason);
        }
        for cluster in fetched.skipped {
            report.record_skipped(cluster);
        }

        let content = self.generator.serialize(&document)?;
        info!(summary = %report.summary(), "Kubeconfig generated");

        Ok(GeneratedKubeconfig {
            content,
            document,
            report
        })
    }
}

/// Split `clusters` into those picked by `selection` and the selectors that
/// matched nothing.
fn select(clusters: Vec<Cluster>, selection: &[String]) -> (Vec<Cluster>, Vec<String>) {
    if selection.is_empty() {
        return (clusters, Vec::new());
    }

    let unknown = selection
        .iter()
        .filter(|selector| !clusters.iter().any(|c| c.matches(selector)))
        .cloned()
        .collect();
    let picked = clusters
        .into_iter()
        .filter(|c| selection.iter().any(|selector| c.matches(selector)))
        .collect();

    (picked, unknown)
}
