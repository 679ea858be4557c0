use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A cluster record as listed by `GET /v3/clusters`.
#[derive(Debug, Clone)]
pub struct MockCluster {
    pub id: String,
    pub name: String,
    pub state: String,
    pub provider: String
}

impl MockCluster {
    pub fn active(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            state: "active".to_string(),
            provider: "rke2".to_string()
        }
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = state.to_string();
        self
    }

    fn to_json(&self, base_url: &str) -> Value {
        let self_link = format!("{}/v3/clusters/{}", base_url, self.id);
        json!({
            "id": self.id,
            "type": "cluster",
            "name": self.name,
            "description": "",
            "state": self.state,
            "provider": self.provider,
            "links": {
                "self": self_link,
            },
            "actions": {
                "generateKubeconfig": format!("{}?action=generateKubeconfig", self_link),
            }
        })
    }
}

/// Wiremock server standing in for a Rancher instance.
pub struct MockRancher {
    server: MockServer
}

impl MockRancher {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        tracing::debug!(url = %server.uri(), "Mock Rancher started");
        Self { server }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub async fn with_clusters(&self, clusters: &[MockCluster]) {
        let data: Vec<Value> = clusters.iter().map(|c| c.to_json(&self.url())).collect();
        Mock::given(method("GET"))
            .and(path("/v3/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "collection",
                "data": data,
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn serve_kubeconfig(&self, cluster_id: &str, kubeconfig: &str) {
        self.kubeconfig_response(
            cluster_id,
            ResponseTemplate::new(200).set_body_json(json!({
                "type": "generateKubeConfigOutput",
                "config": kubeconfig,
            }))
        )
        .await;
    }

    pub async fn serve_kubeconfig_after(&self, cluster_id: &str, kubeconfig: &str, delay: Duration) {
        self.kubeconfig_response(
            cluster_id,
            ResponseTemplate::new(200)
                .set_body_json(json!({ "config": kubeconfig }))
                .set_delay(delay)
        )
        .await;
    }

    pub async fn fail_kubeconfig(&self, cluster_id: &str, status: u16) {
        self.kubeconfig_response(
            cluster_id,
            ResponseTemplate::new(status).set_body_string("internal error")
        )
        .await;
    }

    async fn kubeconfig_response(&self, cluster_id: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(format!("/v3/clusters/{}", cluster_id)))
            .and(query_param("action", "generateKubeconfig"))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }
}
