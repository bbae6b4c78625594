//! Error types for KV store access.

use thiserror::Error;

/// Result type alias for KV operations.
pub type KvResult<T> = Result<T, KvError>;

/// Which backing store an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvStore {
    Consul,
    Vault,
}

impl std::fmt::Display for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consul => write!(f, "consul"),
            Self::Vault => write!(f, "vault"),
        }
    }
}

/// Errors that can occur while querying Consul or Vault.
#[derive(Error, Debug)]
pub enum KvError {
    #[error("Connection to {store} failed: {message}")]
    Connection { store: KvStore, message: String },

    #[error("{store} rejected the request as unauthorized: {message}")]
    Auth { store: KvStore, message: String },

    #[error("Key not found in {store}: {path}")]
    NotFound { store: KvStore, path: String },

    #[error("{store} request for {path} timed out")]
    Timeout { store: KvStore, path: String },

    #[error("Unexpected {store} response for {path}: {message}")]
    Protocol {
        store: KvStore,
        path: String,
        message: String,
    },
}

impl KvError {
    /// Build an error from a failed reqwest transport call.
    pub(crate) fn from_transport(store: KvStore, path: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                store,
                path: path.to_string(),
            }
        } else {
            Self::Connection {
                store,
                message: err.to_string(),
            }
        }
    }
}
