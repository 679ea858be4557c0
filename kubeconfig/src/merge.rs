//! # Document Merger
//!
//! Combines already-rewritten kubeconfigs into one document.
//!
//! Sources are applied in cluster-name order. When two sources define the
//! same entry name the later one wins and the collision is reported.

use crate::model::{AccessDocument, DocumentMetadata, EntryKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Two sources defined an entry under the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionWarning {
    pub kind: EntryKind,
    pub name: String,
    /// Source whose entry was overwritten.
    pub previous_source: String,
    /// Source whose entry was kept.
    pub source: String
}

impl fmt::Display for CollisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' from cluster '{}' overwrote the one from cluster '{}'",
            self.kind, self.name, self.source, self.previous_source
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub document: AccessDocument,
    pub collisions: Vec<CollisionWarning>
}

/// Tracks which source contributed each entry name.
#[derive(Default)]
struct Owners {
    by_entry: BTreeMap<(EntryKind, String), String>,
    collisions: Vec<CollisionWarning>
}

impl Owners {
    fn claim(&mut self, kind: EntryKind, name: &str, source: &str) {
        if let Some(previous) = self
            .by_entry
            .insert((kind, name.to_string()), source.to_string())
        {
            warn!(
                kind = %kind,
                name = name,
                previous_source = %previous,
                source = source,
                "Kubeconfig entry name collision"
            );
            self.collisions.push(CollisionWarning {
                kind,
                name: name.to_string(),
                previous_source: previous,
                source: source.to_string()
            });
        }
    }
}

/// Merge `(cluster name, document)` pairs into a single document.
///
/// The active context survives only when exactly one document is merged;
/// metadata is always reset to the default.
pub fn combine(sources: Vec<(String, AccessDocument)>) -> MergeOutcome {
    let mut sources = sources;
    sources.sort_by(|(a, _), (b, _)| a.cmp(b));

    let single_source = sources.len() == 1;
    let mut merged = AccessDocument {
        metadata: DocumentMetadata::default(),
        ..AccessDocument::default()
    };
    let mut owners = Owners::default();

    for (source, document) in &sources {
        for (name, cluster) in &document.clusters {
            owners.claim(EntryKind::Cluster, name, source);
            merged.clusters.insert(name.clone(), cluster.clone());
        }
        for (name, credential) in &document.credentials {
            owners.claim(EntryKind::Credential, name, source);
            merged.credentials.insert(name.clone(), credential.clone());
        }
        for (name, context) in &document.contexts {
            owners.claim(EntryKind::Context, name, source);
            merged.contexts.insert(name.clone(), context.clone());
        }
        debug!(source = %source, "Merged kubeconfig source");
    }

    if single_source {
        merged.active_context = sources[0].1.active_context.clone();
    }

    MergeOutcome {
        document: merged,
        collisions: owners.collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClusterEntry, ContextEntry, CredentialEntry};
    use crate::rewrite::rewrite;

    fn document(cluster: &str, server: &str) -> AccessDocument {
        let mut doc = AccessDocument::new();
        doc.clusters
            .insert(cluster.to_string(), ClusterEntry::new(server));
        doc.credentials
            .insert(cluster.to_string(), CredentialEntry::token(format!("{cluster}-token")));
        doc.contexts
            .insert(cluster.to_string(), ContextEntry::new(cluster, Some(cluster)));
        doc.active_context = Some(cluster.to_string());
        doc
    }

    #[test]
    fn test_merge_without_collision() {
        let a = rewrite(&document("a", "https://a"), "r-", "a");
        let b = rewrite(&document("b", "https://b"), "r-", "b");

        let outcome = combine(vec![("a".to_string(), a), ("b".to_string(), b)]);

        assert!(outcome.collisions.is_empty());
        assert_eq!(outcome.document.clusters.len(), 2);
        assert_eq!(outcome.document.credentials.len(), 2);
        assert_eq!(outcome.document.contexts.len(), 2);
        assert!(outcome.document.validate().is_ok());
    }

    #[test]
    fn test_merge_with_collision_last_wins() {
        let mut first = document("alpha", "https://alpha");
        first
            .clusters
            .insert("default".to_string(), ClusterEntry::new("https://alpha-default"));
        let mut second = document("beta", "https://beta");
        second
            .clusters
            .insert("default".to_string(), ClusterEntry::new("https://beta-default"));

        // Order of the input must not matter: sources are sorted by name.
        let outcome = combine(vec![
            ("beta".to_string(), second),
            ("alpha".to_string(), first),
        ]);

        assert_eq!(outcome.document.clusters["default"].server, "https://beta-default");
        assert_eq!(
            outcome.collisions,
            vec![CollisionWarning {
                kind: EntryKind::Cluster,
                name: "default".to_string(),
                previous_source: "alpha".to_string(),
                source: "beta".to_string()
            }]
        );
    }

    #[test]
    fn test_single_source_keeps_active_context() {
        let doc = rewrite(&document("c1", "https://c1"), "prod-", "c1");
        let outcome = combine(vec![("c1".to_string(), doc)]);
        assert_eq!(outcome.document.active_context.as_deref(), Some("prod-c1"));
    }

    #[test]
    fn test_multiple_sources_drop_active_context() {
        let outcome = combine(vec![
            ("a".to_string(), document("a", "https://a")),
            ("b".to_string(), document("b", "https://b")),
        ]);
        assert_eq!(outcome.document.active_context, None);
    }

    #[test]
    fn test_metadata_is_reset() {
        let mut doc = document("a", "https://a");
        doc.metadata.kind = "Something".to_string();

        let outcome = combine(vec![("a".to_string(), doc)]);
        assert_eq!(outcome.document.metadata, DocumentMetadata::default());
    }

    #[test]
    fn test_empty_input() {
        let outcome = combine(Vec::new());
        assert!(outcome.document.is_empty());
        assert_eq!(outcome.document.active_context, None);
    }

    #[test]
    fn test_collision_display() {
        let warning = CollisionWarning {
            kind: EntryKind::Context,
            name: "default".to_string(),
            previous_source: "a".to_string(),
            source: "b".to_string()
        };
        assert_eq!(
            warning.to_string(),
            "context 'default' from cluster 'b' overwrote the one from cluster 'a'"
        );
    }
}
