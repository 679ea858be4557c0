use anyhow::Result;

pub const BINARY_NAME: &str = "rancher-kubeconfig-proxy";

pub fn version_line() -> String {
    format!("{} {}", BINARY_NAME, env!("CARGO_PKG_VERSION"))
}

pub fn run() -> Result<()> {
    println!("{}", version_line());
    Ok(())
}
