use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use config::ConfigLayer;
use rancher::{CancellationToken, KubeconfigProxy};
use tokio::signal;

use super::connection::ConnectionArgs;
use crate::{output, ux_error};

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(long, help = "Prefix added to every cluster, user and context name")]
    pub prefix: Option<String>,

    #[arg(short, long, value_name = "PATH", help = "Write the kubeconfig here instead of stdout")]
    pub output: Option<PathBuf>,

    #[arg(
        long = "cluster",
        value_name = "ID|NAME",
        help = "Only include this cluster (repeatable)"
    )]
    pub clusters: Vec<String>,

    #[arg(long, help = "Number of kubeconfigs downloaded in parallel")]
    pub concurrency: Option<usize>,

    #[arg(long, value_name = "SECONDS", help = "Timeout of a single kubeconfig download")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Print the generation report as JSON on stderr")]
    pub json: bool,
}

impl GenerateArgs {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            cluster_prefix: self.prefix.clone(),
            output_path: self.output.clone(),
            fetch_concurrency: self.concurrency,
            fetch_timeout_seconds: self.timeout,
            ..self.connection.layer()
        }
    }
}

pub async fn run(args: GenerateArgs) -> Result<()> {
    let config = args.connection.resolve(args.layer())?;

    let proxy = KubeconfigProxy::from_config(&config).map_err(|e| {
        ux_error::rancher_error(&e, &config.rancher_url).display();
        anyhow::anyhow!(e)
    })?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, cancelling remaining downloads");
            trigger.cancel();
        }
    });

    let generated = proxy
        .generate(&args.clusters, &cancel)
        .await
        .map_err(|e| {
            ux_error::rancher_error(&e, &config.rancher_url).display();
            anyhow::anyhow!(e)
        })?;
    let report = &generated.report;

    if args.json {
        eprintln!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for warning in &report.warnings {
            output::warn(&warning.to_string());
        }
        output::info(&report.summary());
    }

    if report.merged.is_empty() {
        ux_error::nothing_merged(&report.summary()).display();
        anyhow::bail!("no cluster could be merged");
    }

    match &config.output_path {
        Some(path) => {
            write_kubeconfig(path, &generated.content).map_err(|e| {
                ux_error::write_failed(path, &e.to_string()).display();
                e
            })?;
            if !args.json {
                output::success(&format!("Kubeconfig written to {}", path.display()));
            }
        }
        None => print!("{}", generated.content),
    }

    Ok(())
}

/// Write with owner-only permissions, creating parent directories.
fn write_kubeconfig(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        // Tighten an existing file before the new credentials land in it.
        if path.exists() {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    fs::write(path, content)?;

    Ok(())
}
