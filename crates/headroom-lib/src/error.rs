//! Error types for the headroom library

use thiserror::Error;

/// Errors produced while extracting requests, parsing quantities or
/// fetching a cluster snapshot.
#[derive(Debug, Error)]
pub enum Error {
    /// A resource quantity string could not be parsed
    #[error("invalid quantity {value:?}: {reason}")]
    InvalidQuantity { value: String, reason: &'static str },

    /// A resource quantity does not fit in 64 bits once converted
    #[error("quantity {0:?} overflows the supported range")]
    QuantityOverflow(String),

    /// The cluster snapshot could not be fetched
    #[error("failed to fetch cluster snapshot: {0}")]
    Snapshot(#[from] kube::Error),

    /// A snapshot file could not be read
    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot file is not valid JSON
    #[error("failed to parse snapshot file: {0}")]
    Json(#[from] serde_json::Error),

    /// The kubeconfig file could not be loaded
    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
}

impl Error {
    pub(crate) fn invalid(value: &str, reason: &'static str) -> Self {
        Error::InvalidQuantity {
            value: value.to_string(),
            reason,
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
