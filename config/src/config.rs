//! # Configuration Structures
//!
//! [`ConfigLayer`] is what a single source (file, environment, CLI) can
//! contribute: every field optional. Layers are merged by
//! [`crate::precedence::merge_layers`] and the result is validated into a
//! [`ProxyConfig`] by [`ConfigLayer::resolve`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 30;

/// Partial configuration from one source.
///
/// ## Fields
/// - `rancher_url`: Rancher server URL, e.g. `https://rancher.example.com`
/// - `token`: combined `access_key:secret_key` API token
/// - `access_key` / `secret_key`: the two halves of an API key
/// - `cluster_prefix`: prefix applied to every cluster, user and context name
/// - `output_path`: kubeconfig destination (stdout when unset)
/// - `insecure_skip_tls_verify`: skip TLS certificate verification
/// - `ca_cert`: PEM file trusted as an additional root certificate
/// - `fetch_concurrency`: parallel kubeconfig downloads (default: 8)
/// - `fetch_timeout_seconds`: timeout of a single download (default: 30)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub rancher_url: Option<String>,
    pub token: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub cluster_prefix: Option<String>,
    pub output_path: Option<PathBuf>,
    pub insecure_skip_tls_verify: Option<bool>,
    pub ca_cert: Option<PathBuf>,
    pub fetch_concurrency: Option<usize>,
    pub fetch_timeout_seconds: Option<u64>
}

/// Validated configuration handed to the Rancher client and the generator.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProxyConfig {
    #[validate(url)]
    pub rancher_url: String,

    pub credentials: Credentials,

    pub cluster_prefix: String,

    /// `None` writes to stdout.
    pub output_path: Option<PathBuf>,

    pub tls: TlsConfig,

    #[validate(nested)]
    pub fetch: FetchConfig
}

/// Rancher API key, sent as HTTP basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    pub insecure_skip_verify: bool,
    pub ca_cert: Option<PathBuf>
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct FetchConfig {
    #[validate(range(min = 1, max = 64))]
    pub concurrency: usize,

    #[validate(range(min = 1, max = 600))]
    pub timeout_seconds: u64
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECONDS
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Credentials {
    /// Work out the API key from a combined token and/or an explicit pair.
    ///
    /// A token must be exactly `access:secret` with both halves non-empty.
    /// When both a token and a pair are given they must agree.
    pub fn resolve(
        token: Option<&str>,
        access_key: Option<&str>,
        secret_key: Option<&str>
    ) -> Result<Self, ConfigError> {
        let access_key = access_key.filter(|k| !k.is_empty());
        let secret_key = secret_key.filter(|k| !k.is_empty());

        match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let from_token = Self::parse_token(token)?;
                let conflicts = access_key.is_some_and(|k| k != from_token.access_key)
                    || secret_key.is_some_and(|k| k != from_token.secret_key);
                if conflicts {
                    return Err(ConfigError::ConflictingCredentials);
                }
                Ok(from_token)
            }
            None => match (access_key, secret_key) {
                (Some(access_key), Some(secret_key)) => Ok(Self {
                    access_key: access_key.to_string(),
                    secret_key: secret_key.to_string()
                }),
                _ => Err(ConfigError::MissingCredentials)
            }
        }
    }

    pub fn parse_token(token: &str) -> Result<Self, ConfigError> {
        let mut parts = token.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(access_key), Some(secret_key), None)
                if !access_key.is_empty() && !secret_key.is_empty() =>
            {
                Ok(Self {
                    access_key: access_key.to_string(),
                    secret_key: secret_key.to_string()
                })
            }
            _ => Err(ConfigError::InvalidToken)
        }
    }

    pub fn basic_auth(&self) -> (&str, &str) {
        (&self.access_key, &self.secret_key)
    }
}

impl ConfigLayer {
    /// Validate the merged layer into a [`ProxyConfig`].
    pub fn resolve(self) -> Result<ProxyConfig, ConfigError> {
        let rancher_url = self
            .rancher_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingUrl)?
            .trim_end_matches('/')
            .to_string();

        let credentials = Credentials::resolve(
            self.token.as_deref(),
            self.access_key.as_deref(),
            self.secret_key.as_deref()
        )?;

        let config = ProxyConfig {
            rancher_url,
            credentials,
            cluster_prefix: self.cluster_prefix.unwrap_or_default(),
            output_path: self
                .output_path
                .filter(|path| !path.as_os_str().is_empty()),
            tls: TlsConfig {
                insecure_skip_verify: self.insecure_skip_tls_verify.unwrap_or(false),
                ca_cert: self.ca_cert.filter(|path| !path.as_os_str().is_empty())
            },
            fetch: FetchConfig {
                concurrency: self
                    .fetch_concurrency
                    .unwrap_or(DEFAULT_FETCH_CONCURRENCY),
                timeout_seconds: self
                    .fetch_timeout_seconds
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECONDS)
            }
        };

        config.validate()?;
        Ok(config)
    }
}
