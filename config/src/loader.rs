//! # Environment Variable Loader
//!
//! Reads a [`ConfigLayer`] from `RANCHER_*` environment variables.
//!
//! ## Environment Variables
//! - `RANCHER_URL`: Rancher server URL
//! - `RANCHER_TOKEN`: combined `access_key:secret_key` token
//! - `RANCHER_ACCESS_KEY` / `RANCHER_SECRET_KEY`: API key pair
//! - `RANCHER_CLUSTER_PREFIX`: name prefix
//! - `RANCHER_KUBECONFIG_OUTPUT`: output path
//! - `RANCHER_INSECURE_SKIP_TLS_VERIFY`: `true`/`1` to skip verification
//! - `RANCHER_CA_CERT`: CA certificate file
//! - `RANCHER_FETCH_CONCURRENCY`: parallel downloads
//! - `RANCHER_FETCH_TIMEOUT_SECONDS`: per-download timeout

use crate::config::ConfigLayer;
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

pub const ENV_URL: &str = "RANCHER_URL";
pub const ENV_TOKEN: &str = "RANCHER_TOKEN";
pub const ENV_ACCESS_KEY: &str = "RANCHER_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "RANCHER_SECRET_KEY";
pub const ENV_CLUSTER_PREFIX: &str = "RANCHER_CLUSTER_PREFIX";
pub const ENV_OUTPUT: &str = "RANCHER_KUBECONFIG_OUTPUT";
pub const ENV_INSECURE_SKIP_TLS_VERIFY: &str = "RANCHER_INSECURE_SKIP_TLS_VERIFY";
pub const ENV_CA_CERT: &str = "RANCHER_CA_CERT";
pub const ENV_FETCH_CONCURRENCY: &str = "RANCHER_FETCH_CONCURRENCY";
pub const ENV_FETCH_TIMEOUT_SECONDS: &str = "RANCHER_FETCH_TIMEOUT_SECONDS";

/// Every variable [`load_from_env`] reads.
pub const ALL_ENV_VARS: &[&str] = &[
    ENV_URL,
    ENV_TOKEN,
    ENV_ACCESS_KEY,
    ENV_SECRET_KEY,
    ENV_CLUSTER_PREFIX,
    ENV_OUTPUT,
    ENV_INSECURE_SKIP_TLS_VERIFY,
    ENV_CA_CERT,
    ENV_FETCH_CONCURRENCY,
    ENV_FETCH_TIMEOUT_SECONDS
];

/// Load a configuration layer from the environment.
///
/// Unset or empty variables leave the field unset so lower-precedence
/// sources still apply. Malformed numbers are an error.
pub fn load_from_env() -> Result<ConfigLayer, ConfigError> {
    Ok(ConfigLayer {
        rancher_url: var(ENV_URL),
        token: var(ENV_TOKEN),
        access_key: var(ENV_ACCESS_KEY),
        secret_key: var(ENV_SECRET_KEY),
        cluster_prefix: var(ENV_CLUSTER_PREFIX),
        output_path: var(ENV_OUTPUT).map(PathBuf::from),
        insecure_skip_tls_verify: var(ENV_INSECURE_SKIP_TLS_VERIFY).map(|v| parse_bool(&v)),
        ca_cert: var(ENV_CA_CERT).map(PathBuf::from),
        fetch_concurrency: parse_env(ENV_FETCH_CONCURRENCY)?,
        fetch_timeout_seconds: parse_env(ENV_FETCH_TIMEOUT_SECONDS)?
    })
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match var(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value
            }),
        None => Ok(None)
    }
}
