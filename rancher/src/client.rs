use crate::error::{RancherError, RancherResult};
use async_trait::async_trait;
use config::{Credentials, ProxyConfig};
use reqwest::{Certificate, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Anything that can list clusters and hand out their kubeconfigs.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    async fn list_clusters(&self) -> RancherResult<Vec<Cluster>>;
    async fn get_cluster_kubeconfig(&self, cluster: &Cluster) -> RancherResult<String>;
}

/// A downstream cluster managed by Rancher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub links: ClusterLinks,
    #[serde(default)]
    pub actions: ClusterActions
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterActions {
    #[serde(rename = "generateKubeconfig", default)]
    pub generate_kubeconfig: Option<String>
}

impl Cluster {
    pub const ACTIVE_STATE: &'static str = "active";

    pub fn new(id: &str, name: &str, state: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == Self::ACTIVE_STATE
    }

    /// Whether `selector` names this cluster by id or by name.
    pub fn matches(&self, selector: &str) -> bool {
        self.id == selector || self.name == selector
    }
}

#[derive(Debug, Deserialize)]
struct ClusterCollection {
    #[serde(default)]
    data: Vec<Cluster>
}

#[derive(Debug, Deserialize)]
struct KubeconfigResponse {
    config: String
}

/// Client for the Rancher v3 API.
pub struct RancherClient {
    client: Client,
    base_url: String,
    credentials: Credentials
}

impl RancherClient {
    pub fn new(config: &ProxyConfig) -> RancherResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.fetch.timeout())
            .danger_accept_invalid_certs(config.tls.insecure_skip_verify);

        if let Some(path) = &config.tls.ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                RancherError::CertificateError(format!(
                    "failed to read CA certificate {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| {
                RancherError::CertificateError(format!("failed to parse CA certificate: {}", e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder.build().map_err(RancherError::HttpError)?;

        Ok(Self {
            client,
            base_url: config.rancher_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone()
        })
    }

    fn kubeconfig_url(&self, cluster: &Cluster) -> String {
        match cluster.actions.generate_kubeconfig.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!(
                "{}/v3/clusters/{}?action=generateKubeconfig",
                self.base_url, cluster.id
            )
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> RancherResult<T> {
        let (username, password) = self.credentials.basic_auth();
        let response = request
            .basic_auth(username, Some(password))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => response
                .json::<T>()
                .await
                .map_err(|e| RancherError::DecodeError {
                    what: what.to_string(),
                    reason: e.to_string()
                }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(RancherError::AuthenticationError(format!(
                    "Rancher rejected the API key (status {})",
                    response.status().as_u16()
                )))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RancherError::ApiError {
                    status: status.as_u16(),
                    message: body
                })
            }
        }
    }
}

#[async_trait]
impl ClusterSource for RancherClient {
    async fn list_clusters(&self) -> RancherResult<Vec<Cluster>> {
        let url = format!("{}/v3/clusters", self.base_url);
        debug!(url = %url, "Listing Rancher clusters");

        let collection: ClusterCollection = self.send(self.client.get(&url), "clusters").await?;
        Ok(collection.data)
    }

    async fn get_cluster_kubeconfig(&self, cluster: &Cluster) -> RancherResult<String> {
        let url = self.kubeconfig_url(cluster);
        debug!(cluster = %cluster.name, url = %url, "Requesting kubeconfig");

        let response: KubeconfigResponse = self.send(self.client.post(&url), "kubeconfig").await?;
        Ok(response.config)
    }
}

pub fn create_rancher_client(config: &ProxyConfig) -> RancherResult<Arc<dyn ClusterSource>> {
    Ok(Arc::new(RancherClient::new(config)?))
}
