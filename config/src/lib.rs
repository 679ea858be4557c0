//! # Configuration System
//!
//! Configuration for rancher-kubeconfig-proxy.
//!
//! This crate provides:
//! - Partial configuration layers and the validated [`ProxyConfig`]
//! - Environment variable loading (`RANCHER_*`)
//! - Configuration file loading (TOML/YAML)
//! - Configuration precedence (CLI > env > file > defaults)
//! - Credential resolution from a combined token or a key pair

pub mod config;
pub mod error;
pub mod file_loader;
pub mod loader;
pub mod precedence;

pub use config::{ConfigLayer, Credentials, FetchConfig, ProxyConfig, TlsConfig};
pub use error::ConfigError;
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use loader::load_from_env;
pub use precedence::merge_layers;
