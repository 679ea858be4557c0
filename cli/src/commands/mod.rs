pub mod completion;
pub mod connection;
pub mod generate;
pub mod list;
pub mod version;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rancher-kubeconfig-proxy",
    author,
    version,
    about = "Generate one kubeconfig for every cluster managed by Rancher",
    long_about = "Lists the clusters of a Rancher server, downloads the kubeconfig of each active \
                  one and merges them into a single file.\n\nSettings come from flags, RANCHER_* \
                  environment variables or a TOML/YAML file passed with --config."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Generate the merged kubeconfig")]
    Generate(generate::GenerateArgs),

    #[command(about = "List the clusters known to Rancher")]
    List(list::ListArgs),

    #[command(about = "Print the version")]
    Version,

    #[command(about = "Generate shell completions")]
    Completion(completion::CompletionArgs)
}
