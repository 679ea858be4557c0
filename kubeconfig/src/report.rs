use crate::merge::CollisionWarning;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-fatal problem met while building the merged kubeconfig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    /// The cluster's kubeconfig could not be retrieved.
    Fetch { cluster: String, reason: String },
    /// The retrieved kubeconfig could not be decoded or was inconsistent.
    Parse { cluster: String, reason: String },
    Collision(CollisionWarning)
}

impl Warning {
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::Collision(_))
    }

    /// Cluster the warning is attributed to.
    pub fn cluster(&self) -> &str {
        match self {
            Self::Fetch { cluster, .. } | Self::Parse { cluster, .. } => cluster,
            Self::Collision(collision) => &collision.source
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { cluster, reason } => {
                write!(f, "failed to get kubeconfig for cluster {cluster}: {reason}")
            }
            Self::Parse { cluster, reason } => {
                write!(f, "failed to parse kubeconfig for cluster {cluster}: {reason}")
            }
            Self::Collision(collision) => write!(f, "name collision: {collision}")
        }
    }
}

/// What happened to each requested cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Clusters that were asked for, whether or not they made it.
    pub requested: usize,
    /// Clusters whose entries are in the output, in merge order.
    pub merged: Vec<String>,
    /// Clusters excluded before fetching (not active).
    pub skipped: Vec<String>,
    pub warnings: Vec<Warning>
}

impl GenerationReport {
    pub fn failed(&self) -> usize {
        self.warnings.iter().filter(|w| !w.is_collision()).count()
    }

    pub fn collisions(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_collision()).count()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Fold in failures that happened before the documents reached the
    /// generator.
    pub fn record_fetch_failure(&mut self, cluster: impl Into<String>, reason: impl ToString) {
        self.requested += 1;
        self.warnings.push(Warning::Fetch {
            cluster: cluster.into(),
            reason: reason.to_string()
        });
    }

    pub fn record_skipped(&mut self, cluster: impl Into<String>) {
        self.requested += 1;
        self.skipped.push(cluster.into());
    }

    /// One-line summary such as
    /// `merged 8 of 10 clusters; 2 skipped; 1 name collision`.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "merged {} of {} clusters",
            self.merged.len(),
            self.requested
        );
        let not_merged = self.requested - self.merged.len().min(self.requested);
        if not_merged > 0 {
            summary.push_str(&format!("; {not_merged} skipped"));
        }
        let collisions = self.collisions();
        if collisions > 0 {
            let noun = if collisions == 1 {
                "name collision"
            } else {
                "name collisions"
            };
            summary.push_str(&format!("; {collisions} {noun}"));
        }
        summary
    }
}
