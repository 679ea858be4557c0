use config::{ConfigLayer, ProxyConfig};
use kubeconfig::{Warning, decode};
use rancher::{CancellationToken, ClusterSource, KubeconfigProxy, RancherClient, RancherError};
use std::time::Duration;
use testing::{MockCluster, MockRancher, kubeconfig_for, kubeconfig_with_node_endpoints};

fn proxy_config(url: &str, prefix: &str) -> ProxyConfig {
    ConfigLayer {
        rancher_url: Some(url.to_string()),
        access_key: Some("token-abc".to_string()),
        secret_key: Some("secret".to_string()),
        cluster_prefix: Some(prefix.to_string()),
        fetch_timeout_seconds: Some(1),
        ..Default::default()
    }
    .resolve()
    .unwrap()
}

#[tokio::test]
async fn test_generate_against_mock_rancher() {
    let rancher = MockRancher::start().await;
    rancher
        .with_clusters(&[
            MockCluster::active("c-1", "prod"),
            MockCluster::active("c-2", "dev"),
            MockCluster::active("c-3", "edge"),
            MockCluster::active("c-4", "new").with_state("provisioning")
        ])
        .await;
    rancher
        .serve_kubeconfig(
            "c-1",
            &kubeconfig_with_node_endpoints("prod", "https://rancher/k8s/clusters/c-1", &["cp1"])
        )
        .await;
    rancher
        .serve_kubeconfig("c-2", &kubeconfig_for("dev", "https://rancher/k8s/clusters/c-2"))
        .await;
    rancher.fail_kubeconfig("c-3", 503).await;

    let proxy = KubeconfigProxy::from_config(&proxy_config(&rancher.url(), "rancher-")).unwrap();
    let generated = proxy.generate(&[], &CancellationToken::new()).await.unwrap();

    let doc = decode(&generated.content).unwrap();
    assert_eq!(
        doc.clusters.keys().collect::<Vec<_>>(),
        vec!["rancher-dev", "rancher-prod", "rancher-prod-cp1"]
    );
    assert_eq!(doc.contexts["rancher-prod-cp1"].cluster, "rancher-prod-cp1");
    assert_eq!(
        doc.contexts["rancher-prod-cp1"].credential.as_deref(),
        Some("rancher-prod")
    );
    assert_eq!(doc.active_context, None);

    let report = &generated.report;
    assert_eq!(report.requested, 4);
    assert_eq!(report.merged, vec!["dev", "prod"]);
    assert_eq!(report.skipped, vec!["new"]);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        &report.warnings[0],
        Warning::Fetch { cluster, reason } if cluster == "edge" && reason.contains("503")
    ));
}

#[tokio::test]
async fn test_slow_cluster_times_out() {
    let rancher = MockRancher::start().await;
    rancher
        .with_clusters(&[
            MockCluster::active("c-1", "prod"),
            MockCluster::active("c-2", "slow")
        ])
        .await;
    rancher
        .serve_kubeconfig("c-1", &kubeconfig_for("prod", "https://prod"))
        .await;
    rancher
        .serve_kubeconfig_after("c-2", &kubeconfig_for("slow", "https://slow"), Duration::from_secs(3))
        .await;

    let proxy = KubeconfigProxy::from_config(&proxy_config(&rancher.url(), "")).unwrap();
    let generated = proxy.generate(&[], &CancellationToken::new()).await.unwrap();

    assert_eq!(generated.report.merged, vec!["prod"]);
    assert_eq!(generated.document.active_context.as_deref(), Some("prod"));
    assert!(matches!(
        &generated.report.warnings[0],
        Warning::Fetch { cluster, .. } if cluster == "slow"
    ));
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let rancher = MockRancher::start().await;

    let proxy = KubeconfigProxy::from_config(&proxy_config(&rancher.url(), "")).unwrap();
    let err = proxy
        .generate(&[], &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RancherError::ApiError { status: 404, .. }));
}

#[tokio::test]
async fn test_list_clusters_through_client() {
    let rancher = MockRancher::start().await;
    rancher
        .with_clusters(&[
            MockCluster::active("c-1", "prod"),
            MockCluster::active("c-2", "dev").with_state("updating")
        ])
        .await;

    let client = RancherClient::new(&proxy_config(&rancher.url(), "")).unwrap();
    let clusters = client.list_clusters().await.unwrap();

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[1].state, "updating");
    assert_eq!(clusters[0].provider.as_deref(), Some("rke2"));
    assert_eq!(
        clusters[0].links.self_link.as_deref(),
        Some(format!("{}/v3/clusters/c-1", rancher.url()).as_str())
    );
}
