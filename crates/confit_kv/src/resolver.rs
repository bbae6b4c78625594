//! KV resolver trait and the HTTP-backed implementation.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::KvConfig;
use crate::consul::ConsulClient;
use crate::error::{KvError, KvResult, KvStore};
use crate::vault::VaultClient;

/// Query-and-resolve seam over the KV stores.
///
/// The renderer only depends on this trait, so tests can substitute a mock
/// and production code can wire in [`HttpResolver`].
#[async_trait]
pub trait KvResolver: Send + Sync {
    /// Resolve a Consul KV path to its stored value.
    async fn consul_get(&self, path: &str) -> KvResult<String>;

    /// Resolve a Vault path to its secret document.
    async fn vault_read(&self, path: &str) -> KvResult<Value>;
}

/// Resolver backed by live Consul and Vault HTTP APIs.
///
/// Either store may be unconfigured; queries against a missing store fail
/// with a connection error naming the gap instead of panicking.
pub struct HttpResolver {
    consul: Option<ConsulClient>,
    vault: Option<VaultClient>,
}

impl HttpResolver {
    /// Build a resolver from connection configuration.
    pub fn new(config: &KvConfig) -> KvResult<Self> {
        let consul = match &config.consul_addr {
            Some(addr) => Some(ConsulClient::new(
                addr.clone(),
                config.consul_token.clone(),
                config.timeout,
            )?),
            None => None,
        };

        let vault = match &config.vault_addr {
            Some(addr) => Some(VaultClient::new(
                addr.clone(),
                config.vault_token.clone(),
                config.timeout,
            )?),
            None => None,
        };

        Ok(Self { consul, vault })
    }
}

#[async_trait]
impl KvResolver for HttpResolver {
    async fn consul_get(&self, path: &str) -> KvResult<String> {
        match &self.consul {
            Some(client) => client.get(path).await,
            None => Err(KvError::Connection {
                store: KvStore::Consul,
                message: "no consul address configured".to_string(),
            }),
        }
    }

    async fn vault_read(&self, path: &str) -> KvResult<Value> {
        match &self.vault {
            Some(client) => client.read(path).await,
            None => Err(KvError::Connection {
                store: KvStore::Vault,
                message: "no vault address configured".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_store_is_a_connection_error() {
        let resolver = HttpResolver::new(&KvConfig::new()).unwrap();

        let err = resolver.consul_get("app/port").await.unwrap_err();
        assert!(matches!(err, KvError::Connection { store: KvStore::Consul, .. }));

        let err = resolver.vault_read("secret/data/app").await.unwrap_err();
        assert!(matches!(err, KvError::Connection { store: KvStore::Vault, .. }));
    }
}
