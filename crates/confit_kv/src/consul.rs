//! Consul KV client.
//!
//! Reads values through the HTTP API using `?raw=true`, which returns the
//! stored bytes directly instead of the base64-wrapped JSON envelope.

use std::time::Duration;

use tracing::debug;

use crate::config::join_url;
use crate::error::{KvError, KvResult, KvStore};

/// Minimal Consul KV read client.
pub struct ConsulClient {
    base: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ConsulClient {
    /// Create a client for the given server address.
    pub fn new(addr: impl Into<String>, token: Option<String>, timeout: Duration) -> KvResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KvError::Connection {
                store: KvStore::Consul,
                message: e.to_string(),
            })?;

        Ok(Self {
            base: addr.into(),
            token,
            client,
        })
    }

    /// Fetch the raw value stored at a KV path.
    pub async fn get(&self, path: &str) -> KvResult<String> {
        let url = join_url(&self.base, &format!("v1/kv/{}", path.trim_start_matches('/')));
        debug!("Consul GET {}", url);

        let mut request = self.client.get(&url).query(&[("raw", "true")]);
        if let Some(token) = &self.token {
            request = request.header("X-Consul-Token", token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| KvError::from_transport(KvStore::Consul, path, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| KvError::from_transport(KvStore::Consul, path, e))?;

        map_consul_status(path, status, body)
    }
}

/// Translate a Consul HTTP status into a value or a structured error.
fn map_consul_status(path: &str, status: u16, body: String) -> KvResult<String> {
    match status {
        200 => Ok(body),
        404 => Err(KvError::NotFound {
            store: KvStore::Consul,
            path: path.to_string(),
        }),
        401 | 403 => Err(KvError::Auth {
            store: KvStore::Consul,
            message: format!("status {}: {}", status, body.trim()),
        }),
        _ => Err(KvError::Protocol {
            store: KvStore::Consul,
            path: path.to_string(),
            message: format!("status {}: {}", status, body.trim()),
        }),
    }
}
