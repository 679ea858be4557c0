use thiserror::Error;

/// Configuration errors. All of them are fatal and raised before any
/// request reaches Rancher.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rancher URL is required")]
    MissingUrl,

    #[error("either token or access_key/secret_key pair is required")]
    MissingCredentials,

    #[error("invalid token format, expected 'access_key:secret_key'")]
    InvalidToken,

    #[error("token does not match the access_key/secret_key pair that was also provided")]
    ConflictingCredentials,

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    File(#[from] crate::file_loader::ConfigFileError)
}
