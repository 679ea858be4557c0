use anyhow::Result;
use clap::Args;
use rancher::{Cluster, KubeconfigProxy};

use super::connection::ConnectionArgs;
use crate::{output, ux_error};

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,
}

pub async fn run(args: ListArgs) -> Result<()> {
    let config = args.connection.resolve(args.connection.layer())?;

    let listed = match KubeconfigProxy::from_config(&config) {
        Ok(proxy) => proxy.list_clusters().await,
        Err(e) => Err(e),
    };
    let clusters = listed.map_err(|e| {
        ux_error::rancher_error(&e, &config.rancher_url).display();
        anyhow::anyhow!(e)
    })?;

    if args.json {
        let rows: Vec<_> = clusters
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "state": c.state,
                    "provider": c.provider
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    output::header(&format!("Clusters on {}", config.rancher_url));
    println!();
    for line in table(&clusters) {
        println!("{line}");
    }

    Ok(())
}

fn table(clusters: &[Cluster]) -> Vec<String> {
    let width = |f: fn(&Cluster) -> &str, title: &str| {
        clusters
            .iter()
            .map(|c| f(c).len())
            .chain(std::iter::once(title.len()))
            .max()
            .unwrap_or_default()
    };
    let id_width = width(|c| c.id.as_str(), "ID");
    let name_width = width(|c| c.name.as_str(), "NAME");
    let state_width = width(|c| c.state.as_str(), "STATE");

    let mut lines = vec![format!(
        "{:id_width$}  {:name_width$}  {:state_width$}  PROVIDER",
        "ID", "NAME", "STATE"
    )];
    for cluster in clusters {
        lines.push(format!(
            "{:id_width$}  {:name_width$}  {:state_width$}  {}",
            cluster.id,
            cluster.name,
            cluster.state,
            cluster.provider.as_deref().unwrap_or("-")
        ));
    }
    lines
}
