use crate::k8s::WorkloadKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdaterError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("failed to decode backend response: {0}")]
    Decode(String),

    #[error("backend returned no configuration for {kind}")]
    EmptyConfig { kind: WorkloadKind },

    #[error("backend rejected request: {0}")]
    Rejected(String),

    #[error("{kind} object {name} not found in namespace {namespace}")]
    NotFound {
        kind: &'static str,
        name: String,
        namespace: String,
    },

    #[error("{kind} object {name} in namespace {namespace} was modified concurrently")]
    Conflict {
        kind: &'static str,
        name: String,
        namespace: String,
    },

    #[error("Kubernetes error: {0}")]
    Kubernetes(String),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("update failed: {0}")]
    UpdateFailed(String),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, UpdaterError>;

impl From<reqwest::Error> for UpdaterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpdaterError::Decode(err.to_string())
        } else {
            UpdaterError::Transport(err.to_string())
        }
    }
}
