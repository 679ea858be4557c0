//! Shared test fixtures for the rancher-kubeconfig-proxy workspace.
//!
//! - Kubeconfig documents shaped like the ones Rancher's
//!   `generateKubeconfig` action returns
//! - [`MockRancher`], a wiremock server speaking the subset of the Rancher
//!   v3 API the proxy uses

mod fixtures;
mod rancher;

pub use fixtures::*;
pub use rancher::*;
