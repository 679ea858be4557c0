//! # Identifier Rewriter
//!
//! Renames every identifier of one source kubeconfig under a prefix so that
//! documents from different clusters can live side by side.
//!
//! Every reference is rewritten with the same rule used to rename its
//! target, so a valid input stays valid.

use crate::model::{AccessDocument, ContextEntry};
use tracing::debug;

/// Naming rules for one source document.
///
/// Entries named after the source cluster itself get the canonical name
/// `prefix + cluster`, which callers can construct without reading the
/// document. Every other cluster or context entry is `prefix + original`,
/// and credentials are always `prefix + original`.
#[derive(Debug, Clone)]
pub struct Renamer<'a> {
    prefix: &'a str,
    own_cluster: &'a str,
    canonical: String
}

impl<'a> Renamer<'a> {
    pub fn new(prefix: &'a str, own_cluster: &'a str) -> Self {
        Self {
            prefix,
            own_cluster,
            canonical: format!("{prefix}{own_cluster}")
        }
    }

    /// The name the source cluster's own entries end up with.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn cluster(&self, name: &str) -> String {
        self.scoped(name)
    }

    pub fn context(&self, name: &str) -> String {
        self.scoped(name)
    }

    pub fn credential(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    fn scoped(&self, name: &str) -> String {
        if name == self.own_cluster {
            self.canonical.clone()
        } else {
            format!("{}{}", self.prefix, name)
        }
    }

    fn context_entry(&self, context: &ContextEntry) -> ContextEntry {
        ContextEntry {
            cluster: if context.cluster.is_empty() {
                String::new()
            } else {
                self.cluster(&context.cluster)
            },
            credential: context
                .credential
                .as_deref()
                .map(|credential| self.credential(credential)),
            extra: context.extra.clone()
        }
    }
}

/// Return a copy of `document` with all identifiers renamed under `prefix`.
///
/// `own_cluster` is the cluster's name as known to the control plane. An
/// empty prefix returns an identical copy.
pub fn rewrite(document: &AccessDocument, prefix: &str, own_cluster: &str) -> AccessDocument {
    if prefix.is_empty() {
        return document.clone();
    }

    let renamer = Renamer::new(prefix, own_cluster);

    let rewritten = AccessDocument {
        clusters: document
            .clusters
            .iter()
            .map(|(name, cluster)| (renamer.cluster(name), cluster.clone()))
            .collect(),
        credentials: document
            .credentials
            .iter()
            .map(|(name, credential)| (renamer.credential(name), credential.clone()))
            .collect(),
        contexts: document
            .contexts
            .iter()
            .map(|(name, context)| (renamer.context(name), renamer.context_entry(context)))
            .collect(),
        active_context: document
            .active_context
            .as_deref()
            .map(|context| renamer.context(context)),
        metadata: document.metadata.clone()
    };

    debug!(
        cluster = own_cluster,
        canonical = renamer.canonical(),
        contexts = rewritten.contexts.len(),
        "Applied name prefix"
    );

    rewritten
}
