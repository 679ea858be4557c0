//! # Kubeconfig Codec
//!
//! Converts between kubeconfig YAML (JSON is accepted too, being a YAML
//! subset) and [`AccessDocument`].
//!
//! Decoding rejects duplicate names within a list and dangling context
//! references. Encoding is byte-stable for a given document: entries are
//! emitted in name order, the top-level fields in a fixed order, and keys
//! of nested opaque maps sorted.

use crate::error::{KubeconfigError, KubeconfigResult};
use crate::model::{
    AccessDocument, ClusterEntry, ContextEntry, CredentialEntry, DocumentMetadata, EntryKind,
    Extra
};
use serde::{Deserialize, Serialize};
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct RawKubeconfig {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    clusters: Vec<Named<ClusterEntry>>,

    #[serde(default, deserialize_with = "null_as_empty")]
    users: Vec<Named<CredentialEntry>>,

    #[serde(default, deserialize_with = "null_as_empty")]
    contexts: Vec<Named<ContextEntry>>,

    #[serde(rename = "current-context", default)]
    current_context: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    preferences: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    extensions: Option<Value>,

    #[serde(flatten)]
    extra: Extra
}

/// One `- name: x` list item. The payload key differs per list
/// (`cluster`, `user`, `context`), so it is matched untagged.
#[derive(Debug, Serialize, Deserialize)]
struct Named<T> {
    name: String,

    #[serde(flatten)]
    body: Payload<T>
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Cluster { cluster: T },
    User { user: T },
    Context { context: T }
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Cluster { cluster } => cluster,
            Self::User { user } => user,
            Self::Context { context } => context
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>
{
    let value: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Parse kubeconfig text into an [`AccessDocument`].
///
/// Fails when the text is not a well-formed kubeconfig, when a name occurs
/// twice in one list, or when a context references a cluster or credential
/// the document does not define.
pub fn decode(text: &str) -> KubeconfigResult<AccessDocument> {
    let raw: RawKubeconfig = serde_yaml::from_str(text).map_err(|e| KubeconfigError::Parse {
        reason: e.to_string()
    })?;

    let defaults = DocumentMetadata::default();
    let document = AccessDocument {
        clusters: index(raw.clusters, EntryKind::Cluster)?,
        credentials: index(raw.users, EntryKind::Credential)?,
        contexts: index(raw.contexts, EntryKind::Context)?,
        active_context: Some(raw.current_context).filter(|c| !c.is_empty()),
        metadata: DocumentMetadata {
            api_version: raw.api_version.unwrap_or(defaults.api_version),
            kind: raw.kind.unwrap_or(defaults.kind),
            preferences: raw
                .preferences
                .filter(|p| !p.is_null())
                .unwrap_or(defaults.preferences),
            extensions: raw.extensions.filter(|e| !e.is_null()),
            extra: raw.extra
        }
    };

    document.validate()?;

    debug!(
        clusters = document.clusters.len(),
        credentials = document.credentials.len(),
        contexts = document.contexts.len(),
        "Decoded kubeconfig"
    );

    Ok(document)
}

fn index<T>(items: Vec<Named<T>>, kind: EntryKind) -> KubeconfigResult<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for item in items {
        if map.contains_key(&item.name) {
            return Err(KubeconfigError::DuplicateEntry {
                kind,
                name: item.name
            });
        }
        map.insert(item.name, item.body.into_inner());
    }
    Ok(map)
}

/// Serialize an [`AccessDocument`] to kubeconfig YAML.
pub fn encode(document: &AccessDocument) -> KubeconfigResult<String> {
    let raw = RawKubeconfig {
        api_version: Some(document.metadata.api_version.clone()),
        kind: Some(document.metadata.kind.clone()),
        clusters: document
            .clusters
            .iter()
            .map(|(name, cluster)| Named {
                name: name.clone(),
                body: Payload::Cluster {
                    cluster: ClusterEntry {
                        server: cluster.server.clone(),
                        extra: sorted_extra(&cluster.extra)
                    }
                }
            })
            .collect(),
        users: document
            .credentials
            .iter()
            .map(|(name, user)| Named {
                name: name.clone(),
                body: Payload::User {
                    user: CredentialEntry {
                        fields: sorted_extra(&user.fields)
                    }
                }
            })
            .collect(),
        contexts: document
            .contexts
            .iter()
            .map(|(name, context)| Named {
                name: name.clone(),
                body: Payload::Context {
                    context: ContextEntry {
                        extra: sorted_extra(&context.extra),
                        ..context.clone()
                    }
                }
            })
            .collect(),
        current_context: document.active_context.clone().unwrap_or_default(),
        preferences: Some(sorted(&document.metadata.preferences)),
        extensions: document.metadata.extensions.as_ref().map(sorted),
        extra: sorted_extra(&document.metadata.extra)
    };

    serde_yaml::to_string(&raw).map_err(|e| KubeconfigError::Encode {
        reason: e.to_string()
    })
}

fn sorted_extra(extra: &Extra) -> Extra {
    extra
        .iter()
        .map(|(key, value)| (key.clone(), sorted(value)))
        .collect()
}

/// Copy of `value` with every nested mapping rebuilt in key order.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Mapping(mapping) => {
            let mut entries: Vec<(&Value, &Value)> = mapping.iter().collect();
            entries.sort_by_cached_key(|(key, _)| sort_key(key));
            Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sorted(value)))
                    .collect::<Mapping>()
            )
        }
        Value::Sequence(items) => Value::Sequence(items.iter().map(sorted).collect()),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: sorted(&tagged.value)
        })),
        other => other.clone()
    }
}

fn sort_key(key: &Value) -> String {
    match key.as_str() {
        Some(key) => key.to_string(),
        None => serde_yaml::to_string(key).unwrap_or_default()
    }
}
