//! Vault secret client.
//!
//! Reads secret documents through the HTTP API. KV version 2 responses wrap
//! the secret under `data.data`; version 1 mounts return it under `data`.
//! Both shapes are handled so callers never see the difference.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::join_url;
use crate::error::{KvError, KvResult, KvStore};

/// Minimal Vault secret read client.
pub struct VaultClient {
    base: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl VaultClient {
    /// Create a client for the given server address.
    pub fn new(addr: impl Into<String>, token: Option<String>, timeout: Duration) -> KvResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KvError::Connection {
                store: KvStore::Vault,
                message: e.to_string(),
            })?;

        Ok(Self {
            base: addr.into(),
            token,
            client,
        })
    }

    /// Read the secret document stored at a path.
    ///
    /// The path is the full API path under `/v1/`, e.g. `secret/data/myapp`
    /// for a KV v2 mount or `kv/myapp` for v1.
    pub async fn read(&self, path: &str) -> KvResult<Value> {
        let url = join_url(&self.base, &format!("v1/{}", path.trim_start_matches('/')));
        debug!("Vault GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("X-Vault-Token", token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| KvError::from_transport(KvStore::Vault, path, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| KvError::from_transport(KvStore::Vault, path, e))?;

        map_vault_status(path, status, body)
    }
}

/// Translate a Vault HTTP status into a secret document or a structured error.
fn map_vault_status(path: &str, status: u16, body: String) -> KvResult<Value> {
    match status {
        200 => {
            let parsed: Value = serde_json::from_str(&body).map_err(|e| KvError::Protocol {
                store: KvStore::Vault,
                path: path.to_string(),
                message: format!("invalid JSON body: {}", e),
            })?;
            extract_secret(path, parsed)
        }
        404 => Err(KvError::NotFound {
            store: KvStore::Vault,
            path: path.to_string(),
        }),
        // Vault answers 403 both for bad tokens and missing policy grants.
        401 | 403 => Err(KvError::Auth {
            store: KvStore::Vault,
            message: format!("status {}: {}", status, body.trim()),
        }),
        _ => Err(KvError::Protocol {
            store: KvStore::Vault,
            path: path.to_string(),
            message: format!("status {}: {}", status, body.trim()),
        }),
    }
}

/// Unwrap the secret payload from a Vault read response.
fn extract_secret(path: &str, response: Value) -> KvResult<Value> {
    let data = response.get("data").ok_or_else(|| KvError::Protocol {
        store: KvStore::Vault,
        path: path.to_string(),
        message: "response has no data field".to_string(),
    })?;

    // KV v2 nests the secret under data.data next to data.metadata.
    if let Some(inner) = data.get("data") {
        if inner.is_object() && data.get("metadata").is_some() {
            return Ok(inner.clone());
        }
    }

    Ok(data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_kv_v2() {
        let response = json!({
            "data": {
                "data": { "password": "hunter2" },
                "metadata": { "version": 3 }
            }
        });
        let secret = extract_secret("secret/data/app", response).unwrap();
        assert_eq!(secret["password"], "hunter2");
    }

    #[test]
    fn test_extract_kv_v1() {
        let response = json!({
            "data": { "password": "hunter2" }
        });
        let secret = extract_secret("kv/app", response).unwrap();
        assert_eq!(secret["password"], "hunter2");
    }

    #[test]
    fn test_extract_missing_data() {
        let err = extract_secret("kv/app", json!({"errors": []})).unwrap_err();
        assert!(matches!(err, KvError::Protocol { .. }));
    }

    #[test]
    fn test_forbidden_maps_to_auth() {
        let err =
            map_vault_status("secret/data/app", 403, r#"{"errors":["permission denied"]}"#.to_string())
                .unwrap_err();
        assert!(matches!(err, KvError::Auth { store: KvStore::Vault, .. }));
    }

    #[test]
    fn test_missing_secret() {
        let err = map_vault_status("secret/data/gone", 404, String::new()).unwrap_err();
        assert!(matches!(err, KvError::NotFound { .. }));
    }
}
