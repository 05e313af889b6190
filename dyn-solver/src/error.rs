use thiserror::Error;

use crate::dyn_client::ApiError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the solver.
///
/// Every variant is reported synchronously to the caller of `present` or
/// `clean_up`; nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("error decoding solver config: {0}")]
    DecodeConfig(#[source] serde_json::Error),

    #[error("no dyndns {0} provided")]
    MissingField(&'static str),

    #[error("failed to get secret \"{namespace}/{name}\": {source}")]
    SecretLookup {
        namespace: String,
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("key {key:?} not found in secret \"{name}/{namespace}\"")]
    SecretKeyNotFound {
        key: String,
        name: String,
        namespace: String,
    },

    #[error("key {key:?} in secret \"{name}/{namespace}\" is not valid UTF-8")]
    SecretKeyNotUtf8 {
        key: String,
        name: String,
        namespace: String,
    },

    #[error("failed to set up dyn api client: {0}")]
    ClientSetup(#[source] ApiError),

    #[error("failed to create dyn session: {0}")]
    Authentication(#[source] ApiError),

    #[error("failed to {action} record {path}: {source}")]
    Record {
        action: &'static str,
        path: String,
        #[source]
        source: ApiError,
    },

    #[error("failed to commit changes to zone {zone}: {source}")]
    Commit {
        zone: String,
        #[source]
        source: ApiError,
    },

    #[error("solver is not initialized")]
    NotInitialized,

    #[error("group name must be specified")]
    EmptyGroupName,

    #[error("failed to create kubernetes client: {0}")]
    KubeClient(#[source] kube::Error),
}
