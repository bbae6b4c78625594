//! Error types for rendering.

use thiserror::Error;

use confit_kv::KvError;

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering a template.
///
/// Kinds are distinct so callers can branch: connection failures and
/// timeouts are retryable, the rest are not.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    #[error("Authentication failure: {0}")]
    AuthFailure(String),

    #[error("Missing key: {0}")]
    MissingKey(String),

    #[error("Template syntax error at byte {offset}: {message}")]
    TemplateSyntaxError { offset: usize, message: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<KvError> for RenderError {
    fn from(err: KvError) -> Self {
        match err {
            KvError::Connection { .. } => Self::ConnectionFailure(err.to_string()),
            KvError::Auth { .. } => Self::AuthFailure(err.to_string()),
            KvError::NotFound { path, store } => Self::MissingKey(format!("{} path {}", store, path)),
            KvError::Timeout { .. } => Self::Timeout(err.to_string()),
            // A store that answers with garbage is treated like an unreachable
            // store: retryable from the caller's point of view.
            KvError::Protocol { .. } => Self::ConnectionFailure(err.to_string()),
        }
    }
}

impl RenderError {
    /// Whether a caller-side retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailure(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confit_kv::KvStore;

    #[test]
    fn test_kv_error_mapping() {
        let err: RenderError = KvError::NotFound {
            store: KvStore::Consul,
            path: "app/port".to_string(),
        }
        .into();
        assert!(matches!(err, RenderError::MissingKey(_)));
        assert!(!err.is_retryable());

        let err: RenderError = KvError::Timeout {
            store: KvStore::Vault,
            path: "secret/data/app".to_string(),
        }
        .into();
        assert!(matches!(err, RenderError::Timeout(_)));
        assert!(err.is_retryable());
    }
}
