//! # Configuration Precedence
//!
//! Merges configuration layers.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority, applied by `ConfigLayer::resolve`)

use crate::config::ConfigLayer;

/// Merge the three sources, later arguments winning field by field.
pub fn merge_layers(file: ConfigLayer, env: ConfigLayer, cli: ConfigLayer) -> ConfigLayer {
    let merged = merge_with_logging(ConfigLayer::default(), file, "file");
    let merged = merge_with_logging(merged, env, "env");
    merge_with_logging(merged, cli, "cli")
}

fn merge_with_logging(base: ConfigLayer, over: ConfigLayer, source_name: &str) -> ConfigLayer {
    let mut changes = Vec::new();

    let merged = ConfigLayer {
        rancher_url: pick(base.rancher_url, over.rancher_url, "rancher_url", &mut changes),
        token: pick_secret(base.token, over.token, "token", &mut changes),
        access_key: pick(base.access_key, over.access_key, "access_key", &mut changes),
        secret_key: pick_secret(base.secret_key, over.secret_key, "secret_key", &mut changes),
        cluster_prefix: pick(
            base.cluster_prefix,
            over.cluster_prefix,
            "cluster_prefix",
            &mut changes
        ),
        output_path: pick(base.output_path, over.output_path, "output_path", &mut changes),
        insecure_skip_tls_verify: pick(
            base.insecure_skip_tls_verify,
            over.insecure_skip_tls_verify,
            "insecure_skip_tls_verify",
            &mut changes
        ),
        ca_cert: pick(base.ca_cert, over.ca_cert, "ca_cert", &mut changes),
        fetch_concurrency: pick(
            base.fetch_concurrency,
            over.fetch_concurrency,
            "fetch_concurrency",
            &mut changes
        ),
        fetch_timeout_seconds: pick(
            base.fetch_timeout_seconds,
            over.fetch_timeout_seconds,
            "fetch_timeout_seconds",
            &mut changes
        )
    };

    if !changes.is_empty() {
        tracing::debug!("Configuration from {}: {:?}", source_name, changes);
    }

    merged
}

fn pick<T: std::fmt::Debug>(
    base: Option<T>,
    over: Option<T>,
    field: &str,
    changes: &mut Vec<String>
) -> Option<T> {
    match over {
        Some(value) => {
            changes.push(format!("{field} = {value:?}"));
            Some(value)
        }
        None => base
    }
}

fn pick_secret(
    base: Option<String>,
    over: Option<String>,
    field: &str,
    changes: &mut Vec<String>
) -> Option<String> {
    match over {
        Some(value) => {
            changes.push(format!("{field} = ***"));
            Some(value)
        }
        None => base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_overrides_env_overrides_file() {
        let file = ConfigLayer {
            rancher_url: Some("https://file".to_string()),
            cluster_prefix: Some("file-".to_string()),
            output_path: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        let env = ConfigLayer {
            rancher_url: Some("https://env".to_string()),
            cluster_prefix: Some("env-".to_string()),
            ..Default::default()
        };
        let cli = ConfigLayer {
            cluster_prefix: Some("cli-".to_string()),
            ..Default::default()
        };

        let merged = merge_layers(file, env, cli);
        assert_eq!(merged.rancher_url.as_deref(), Some("https://env"));
        assert_eq!(merged.cluster_prefix.as_deref(), Some("cli-"));
        assert_eq!(merged.output_path, Some(PathBuf::from("/from/file")));
    }

    #[test]
    fn test_explicit_empty_prefix_wins() {
        let env = ConfigLayer {
            cluster_prefix: Some("env-".to_string()),
            ..Default::default()
        };
        let cli = ConfigLayer {
            cluster_prefix: Some(String::new()),
            ..Default::default()
        };

        let merged = merge_layers(ConfigLayer::default(), env, cli);
        assert_eq!(merged.cluster_prefix.as_deref(), Some(""));
    }

    #[test]
    fn test_all_empty() {
        let merged = merge_layers(
            ConfigLayer::default(),
            ConfigLayer::default(),
            ConfigLayer::default()
        );
        assert_eq!(merged, ConfigLayer::default());
    }
}
