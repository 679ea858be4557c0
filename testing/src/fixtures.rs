/// Minimal kubeconfig with one cluster, user and context all named `name`,
/// and `name` as the current context.
pub fn kubeconfig_for(name: &str, server: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: "{name}"
  cluster:
    server: "{server}"
    certificate-authority-data: "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0t"
users:
- name: "{name}"
  user:
    token: "kubeconfig-user-{name}:secret"
contexts:
- name: "{name}"
  context:
    user: "{name}"
    cluster: "{name}"
current-context: "{name}"
"#
    )
}

/// Kubeconfig as Rancher issues it for a cluster with an authorized
/// cluster endpoint: an extra cluster and context per control-plane node.
pub fn kubeconfig_with_node_endpoints(name: &str, server: &str, nodes: &[&str]) -> String {
    let mut clusters = format!(
        "- name: \"{name}\"\n  cluster:\n    server: \"{server}\"\n"
    );
    let mut contexts = format!(
        "- name: \"{name}\"\n  context:\n    user: \"{name}\"\n    cluster: \"{name}\"\n"
    );
    for node in nodes {
        clusters.push_str(&format!(
            "- name: \"{name}-{node}\"\n  cluster:\n    server: \"https://{node}:6443\"\n"
        ));
        contexts.push_str(&format!(
            "- name: \"{name}-{node}\"\n  context:\n    user: \"{name}\"\n    cluster: \"{name}-{node}\"\n"
        ));
    }

    format!(
        "apiVersion: v1\nkind: Config\nclusters:\n{clusters}users:\n- name: \"{name}\"\n  user:\n    token: \"kubeconfig-user-{name}:secret\"\ncontexts:\n{contexts}current-context: \"{name}\"\n"
    )
}
