//! # Kubeconfig
//!
//! Rewriting and merge engine for kubeconfig files issued per downstream
//! cluster by a Rancher control plane.
//!
//! This crate provides:
//! - An entity model with referential-integrity checks ([`model`])
//! - A deterministic YAML codec ([`codec`])
//! - Prefix renaming that keeps context references intact ([`rewrite`])
//! - A collision-reporting merger ([`merge`])
//! - The end-to-end [`Generator`] pipeline and its [`GenerationReport`]
//!
//! Nothing here performs I/O; problems that do not prevent producing a
//! document are returned as [`Warning`]s.

pub mod codec;
pub mod error;
pub mod generator;
pub mod merge;
pub mod model;
pub mod report;
pub mod rewrite;

pub use codec::{decode, encode};
pub use error::{KubeconfigError, KubeconfigResult};
pub use generator::{GeneratedKubeconfig, Generator};
pub use merge::{CollisionWarning, MergeOutcome, combine};
pub use model::{
    AccessDocument, ClusterEntry, ContextEntry, CredentialEntry, DocumentMetadata, EntryKind
};
pub use report::{GenerationReport, Warning};
pub use rewrite::{Renamer, rewrite};
