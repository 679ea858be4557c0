use thiserror::Error;

pub type RancherResult<T> = Result<T, RancherError>;

#[derive(Debug, Error)]
pub enum RancherError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Rancher API error: status {status}, body: {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to decode {what} response: {reason}")]
    DecodeError { what: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Certificate error: {0}")]
    CertificateError(String),

    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Kubeconfig(#[from] kubeconfig::KubeconfigError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RancherError::ApiError {
            status: 500,
            message: "boom".to_string()
        };
        assert_eq!(err.to_string(), "Rancher API error: status 500, body: boom");
        assert_eq!(
            RancherError::Timeout { seconds: 30 }.to_string(),
            "Request timed out after 30s"
        );
    }
}
