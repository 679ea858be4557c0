//! Flags shared by every command that talks to Rancher, and the layering of
//! those flags over the environment and the config file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use config::{ConfigError, ConfigLayer, ProxyConfig, load_from_env, load_from_file, merge_layers};

use crate::ux_error;

#[derive(Args, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(long, help = "Rancher server URL, e.g. https://rancher.example.com")]
    pub url: Option<String>,

    #[arg(long, help = "Rancher API token in the form access_key:secret_key")]
    pub token: Option<String>,

    #[arg(long, help = "Rancher API access key")]
    pub access_key: Option<String>,

    #[arg(long, help = "Rancher API secret key")]
    pub secret_key: Option<String>,

    #[arg(long, help = "Skip TLS certificate verification")]
    pub insecure_skip_tls_verify: bool,

    #[arg(long, value_name = "PATH", help = "PEM file with an extra trusted CA certificate")]
    pub ca_cert: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        env = "RANCHER_PROXY_CONFIG",
        help = "TOML or YAML configuration file"
    )]
    pub config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// The flags as a configuration layer. An absent boolean flag leaves the
    /// setting to the lower layers.
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            rancher_url: self.url.clone(),
            token: self.token.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            insecure_skip_tls_verify: self.insecure_skip_tls_verify.then_some(true),
            ca_cert: self.ca_cert.clone(),
            ..Default::default()
        }
    }

    /// Merge `cli` over the environment and the config file and validate the
    /// result. Problems are shown to the user before the error is returned.
    pub fn resolve(&self, cli: ConfigLayer) -> Result<ProxyConfig> {
        let file = match &self.config {
            Some(path) => load_from_file(path).map_err(|e| {
                ux_error::config_file_error(path, &e.to_string()).display();
                anyhow::anyhow!(e)
            })?,
            None => ConfigLayer::default(),
        };

        let env = load_from_env().map_err(|e| {
            ux_error::config_error(&e).display();
            anyhow::anyhow!(e)
        })?;

        merge_layers(file, env, cli).resolve().map_err(|e: ConfigError| {
            ux_error::config_error(&e).display();
            anyhow::anyhow!(e)
        })
    }
}
