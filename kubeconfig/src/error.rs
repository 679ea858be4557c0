use crate::model::EntryKind;
use thiserror::Error;

pub type KubeconfigResult<T> = Result<T, KubeconfigError>;

#[derive(Debug, Error)]
pub enum KubeconfigError {
    #[error("failed to parse kubeconfig: {reason}")]
    Parse { reason: String },

    #[error("duplicate {kind} entry '{name}'")]
    DuplicateEntry { kind: EntryKind, name: String },

    #[error("context '{context}' references unknown {kind} '{name}'")]
    DanglingReference {
        context: String,
        kind: EntryKind,
        name: String
    },

    #[error("failed to serialize kubeconfig: {reason}")]
    Encode { reason: String }
}

impl KubeconfigError {
    /// True for every failure raised while decoding a single source document.
    ///
    /// These are recoverable per cluster: the offending source is dropped
    /// from the merge and reported as a warning.
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, Self::Encode { .. })
    }
}
