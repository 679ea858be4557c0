//! # Kubeconfig Entity Model
//!
//! In-memory form of a kubeconfig document. Only the identifiers and the
//! references between entries are interpreted; everything else (server
//! trust material, auth material, namespaces, extensions, preferences) is
//! carried as opaque YAML values.
//!
//! Maps are `BTreeMap`s so iteration, merging and encoding all see entries
//! in lexicographic order.

use crate::error::{KubeconfigError, KubeconfigResult};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque passthrough fields of an entry, keyed by their wire name.
pub type Extra = BTreeMap<String, Value>;

/// The three kinds of named entries in a kubeconfig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Cluster,
    Credential,
    Context
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster => write!(f, "cluster"),
            Self::Credential => write!(f, "credential"),
            Self::Context => write!(f, "context")
        }
    }
}

/// A cluster endpoint and its trust material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterEntry {
    #[serde(default)]
    pub server: String,

    #[serde(flatten)]
    pub extra: Extra
}

impl ClusterEntry {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            extra: Extra::new()
        }
    }
}

/// Authentication material. Never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialEntry {
    #[serde(flatten)]
    pub fields: Extra
}

impl CredentialEntry {
    pub fn token(token: impl Into<String>) -> Self {
        let mut fields = Extra::new();
        fields.insert("token".to_string(), Value::String(token.into()));
        Self { fields }
    }
}

/// A named pairing of one cluster entry with at most one credential entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    #[serde(default)]
    pub cluster: String,

    #[serde(
        default,
        rename = "user",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub credential: Option<String>,

    #[serde(flatten)]
    pub extra: Extra
}

impl ContextEntry {
    pub fn new(cluster: impl Into<String>, credential: Option<&str>) -> Self {
        Self {
            cluster: cluster.into(),
            credential: credential.map(str::to_string),
            extra: Extra::new()
        }
    }
}

/// Document-level fields. Never merged across documents.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    pub api_version: String,
    pub kind: String,
    pub preferences: Value,
    pub extensions: Option<Value>,
    /// Unknown top-level keys.
    pub extra: Extra
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Config".to_string()
}

fn default_preferences() -> Value {
    Value::Mapping(serde_yaml::Mapping::new())
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            preferences: default_preferences(),
            extensions: None,
            extra: Extra::new()
        }
    }
}

/// A complete kubeconfig: clusters, credentials, contexts and the active
/// context pointer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessDocument {
    pub clusters: BTreeMap<String, ClusterEntry>,
    pub credentials: BTreeMap<String, CredentialEntry>,
    pub contexts: BTreeMap<String, ContextEntry>,
    pub active_context: Option<String>,
    pub metadata: DocumentMetadata
}

impl AccessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.credentials.is_empty() && self.contexts.is_empty()
    }

    /// Check that every context points at entries that exist.
    ///
    /// An empty cluster reference and an absent credential reference are
    /// both allowed.
    pub fn validate(&self) -> KubeconfigResult<()> {
        for (name, context) in &self.contexts {
            if !context.cluster.is_empty() && !self.clusters.contains_key(&context.cluster) {
                return Err(KubeconfigError::DanglingReference {
                    context: name.clone(),
                    kind: EntryKind::Cluster,
                    name: context.cluster.clone()
                });
            }
            if let Some(credential) = &context.credential {
                if !self.credentials.contains_key(credential) {
                    return Err(KubeconfigError::DanglingReference {
                        context: name.clone(),
                        kind: EntryKind::Credential,
                        name: credential.clone()
                    });
                }
            }
        }
        Ok(())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccessDocument {
        let mut doc = AccessDocument::new();
        doc.clusters
            .insert("prod".to_string(), ClusterEntry::new("https://prod.example.com"));
        doc.credentials
            .insert("prod".to_string(), CredentialEntry::token("kubeconfig-u-abc:xyz"));
        doc.contexts
            .insert("prod".to_string(), ContextEntry::new("prod", Some("prod")));
        doc.active_context = Some("prod".to_string());
        doc
    }

    #[test]
    fn test_valid_document_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_dangling_cluster_reference() {
        let mut doc = sample();
        doc.contexts
            .insert("extra".to_string(), ContextEntry::new("missing", None));

        let err = doc.validate().unwrap_err();
        assert!(matches!(
            err,
            KubeconfigError::DanglingReference { kind: EntryKind::Cluster, ref name, .. } if name == "missing"
        ));
    }

    #[test]
    fn test_dangling_credential_reference() {
        let mut doc = sample();
        doc.contexts
            .insert("extra".to_string(), ContextEntry::new("prod", Some("nobody")));

        let err = doc.validate().unwrap_err();
        assert!(matches!(
            err,
            KubeconfigError::DanglingReference { kind: EntryKind::Credential, .. }
        ));
    }

    #[test]
    fn test_empty_references_are_allowed() {
        let mut doc = sample();
        doc.contexts
            .insert("bare".to_string(), ContextEntry::new("", None));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_default_metadata() {
        let metadata = DocumentMetadata::default();
        assert_eq!(metadata.api_version, "v1");
        assert_eq!(metadata.kind, "Config");
        assert!(metadata.preferences.as_mapping().is_some());
    }
}
