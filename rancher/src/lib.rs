//! # Rancher
//!
//! Talks to the Rancher v3 API and drives kubeconfig generation:
//! - [`RancherClient`] lists clusters and requests their kubeconfigs
//! - [`FetchOrchestrator`] downloads them concurrently with a timeout
//! - [`KubeconfigProxy`] ties listing, fetching and merging together

pub mod client;
pub mod error;
pub mod fetch;
pub mod proxy;

pub use client::{
    Cluster, ClusterActions, ClusterLinks, ClusterSource, RancherClient, create_rancher_client
};
pub use error::{RancherError, RancherResult};
pub use fetch::{FetchFailure, FetchOrchestrator, FetchReport};
pub use proxy::KubeconfigProxy;
pub use tokio_util::sync::CancellationToken;
