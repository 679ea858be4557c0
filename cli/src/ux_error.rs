use std::path::Path;

use colored::Colorize;
use config::ConfigError;
use rancher::RancherError;

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>,
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None,
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

pub fn config_error(error: &ConfigError) -> UxError {
    let err = UxError::new(format!("Configuration error: {}", error));
    match error {
        ConfigError::MissingUrl => err
            .why("The Rancher server URL was not given")
            .fix("Pass --url or set RANCHER_URL")
            .suggest("rancher-kubeconfig-proxy generate --url https://rancher.example.com --token <access:secret>"),
        ConfigError::MissingCredentials => err
            .why("An API token or an access/secret key pair is required")
            .fix("Pass --token access:secret or set RANCHER_TOKEN")
            .fix("Or pass --access-key and --secret-key (RANCHER_ACCESS_KEY, RANCHER_SECRET_KEY)"),
        ConfigError::InvalidToken => err
            .why("The token must be the access key and the secret key joined by a single ':'")
            .fix("Copy the bearer token shown when the API key was created in Rancher"),
        ConfigError::ConflictingCredentials => err
            .why("The token and the access/secret keys name different API keys")
            .fix("Give either --token or --access-key/--secret-key, not both"),
        _ => err.fix("Check the values passed as flags, RANCHER_* variables or in the config file"),
    }
}

pub fn config_file_error(path: &Path, reason: &str) -> UxError {
    UxError::new(format!("Cannot load config file '{}'", path.display()))
        .why(reason.to_string())
        .fix("Check the file exists and ends in .toml, .yaml or .yml")
        .fix("Or unset RANCHER_PROXY_CONFIG to run without a config file")
}

pub fn rancher_error(error: &RancherError, url: &str) -> UxError {
    let err = UxError::new(format!("Rancher request failed: {}", error));
    match error {
        RancherError::AuthenticationError(_) => err
            .why(format!("{} did not accept the API key", url))
            .fix("Check the key has not expired or been revoked")
            .fix("Create a new API key under Account & API Keys in Rancher"),
        RancherError::CertificateError(_) => err
            .why("The CA certificate could not be loaded")
            .fix("Point --ca-cert at a PEM encoded certificate")
            .fix("Or pass --insecure-skip-tls-verify for a trusted test server"),
        RancherError::HttpError(_) => err
            .why(format!("{} could not be reached", url))
            .fix("Check the URL and your network connection")
            .fix("Pass --ca-cert if the server uses a private CA"),
        RancherError::Cancelled => UxError::new("Cancelled").why("No kubeconfig was written"),
        _ => err.fix("Run with RUST_LOG=debug for details"),
    }
}

pub fn nothing_merged(summary: &str) -> UxError {
    UxError::new("No cluster could be merged")
        .why(summary.to_string())
        .fix("Check the warnings above for the failing clusters")
        .suggest("rancher-kubeconfig-proxy list")
}

pub fn write_failed(path: &Path, reason: &str) -> UxError {
    UxError::new(format!("Cannot write kubeconfig to '{}'", path.display()))
        .why(reason.to_string())
        .fix("Check the directory is writable")
        .fix("Or omit --output to print the kubeconfig to stdout")
}
