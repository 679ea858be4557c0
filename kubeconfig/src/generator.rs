use crate::codec;
use crate::error::KubeconfigResult;
use crate::merge::{self, MergeOutcome};
use crate::model::AccessDocument;
use crate::report::{GenerationReport, Warning};
use crate::rewrite;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Turns per-cluster kubeconfig text into one merged kubeconfig.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    prefix: String
}

/// The encoded kubeconfig and what went into it.
#[derive(Debug, Clone)]
pub struct GeneratedKubeconfig {
    pub content: String,
    pub document: AccessDocument,
    pub report: GenerationReport
}

impl Generator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into()
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parse(&self, data: &str) -> KubeconfigResult<AccessDocument> {
        codec::decode(data)
    }

    pub fn apply_prefix(&self, document: &AccessDocument, cluster_name: &str) -> AccessDocument {
        rewrite::rewrite(document, &self.prefix, cluster_name)
    }

    /// Decode, rename and combine every source.
    ///
    /// `sources` maps the cluster name to its raw kubeconfig. A source that
    /// fails to decode is left out and reported as [`Warning::Parse`].
    pub fn merge(&self, sources: &BTreeMap<String, String>) -> (AccessDocument, GenerationReport) {
        let mut report = GenerationReport {
            requested: sources.len(),
            ..Default::default()
        };
        let mut rewritten = Vec::with_capacity(sources.len());

        for (cluster, data) in sources {
            match self.parse(data) {
                Ok(document) => {
                    rewritten.push((cluster.clone(), self.apply_prefix(&document, cluster)));
                    report.merged.push(cluster.clone());
                }
                Err(e) => {
                    warn!(cluster = %cluster, error = %e, "Skipping unparseable kubeconfig");
                    report.warnings.push(Warning::Parse {
                        cluster: cluster.clone(),
                        reason: e.to_string()
                    });
                }
            }
        }

        let MergeOutcome {
            document,
            collisions
        } = merge::combine(rewritten);
        report
            .warnings
            .extend(collisions.into_iter().map(Warning::Collision));

        info!(
            merged = report.merged.len(),
            requested = report.requested,
            collisions = report.collisions(),
            "Merged kubeconfigs"
        );

        (document, report)
    }

    pub fn serialize(&self, document: &AccessDocument) -> KubeconfigResult<String> {
        codec::encode(document)
    }

    pub fn generate(&self, sources: &BTreeMap<String, String>) -> KubeconfigResult<GeneratedKubeconfig> {
        let (document, report) = self.merge(sources);
        let content = self.serialize(&document)?;
        Ok(GeneratedKubeconfig {
            content,
            document,
            report
        })
    }
}
