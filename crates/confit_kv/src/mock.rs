//! Mock KV resolver for testing.
//!
//! Serves preset values without network access and records every query so
//! tests can assert how often each path was resolved.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{KvError, KvResult, KvStore};
use crate::resolver::KvResolver;

/// In-memory resolver with preset Consul values and Vault documents.
#[derive(Default)]
pub struct MockResolver {
    consul: HashMap<String, String>,
    vault: HashMap<String, Value>,
    /// When set, every query fails with a clone-like rebuild of this error.
    fail_auth: bool,
    queries: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a Consul key.
    pub fn consul_key(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.consul.insert(path.into(), value.into());
        self
    }

    /// Preset a Vault secret document.
    pub fn vault_secret(mut self, path: impl Into<String>, document: Value) -> Self {
        self.vault.insert(path.into(), document);
        self
    }

    /// Make every query fail with an auth error.
    pub fn deny_all(mut self) -> Self {
        self.fail_auth = true;
        self
    }

    /// All queries issued so far, in order, as `store:path` strings.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// How many times a specific query was issued.
    pub fn query_count(&self, store: &str, path: &str) -> usize {
        let needle = format!("{}:{}", store, path);
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|q| **q == needle)
            .count()
    }

    fn record(&self, store: &str, path: &str) {
        self.queries.lock().unwrap().push(format!("{}:{}", store, path));
    }
}

#[async_trait]
impl KvResolver for MockResolver {
    async fn consul_get(&self, path: &str) -> KvResult<String> {
        self.record("consul", path);
        if self.fail_auth {
            return Err(KvError::Auth {
                store: KvStore::Consul,
                message: "mock denies all".to_string(),
            });
        }
        self.consul
            .get(path)
            .cloned()
            .ok_or_else(|| KvError::NotFound {
                store: KvStore::Consul,
                path: path.to_string(),
            })
    }

    async fn vault_read(&self, path: &str) -> KvResult<Value> {
        self.record("vault", path);
        if self.fail_auth {
            return Err(KvError::Auth {
                store: KvStore::Vault,
                message: "mock denies all".to_string(),
            });
        }
        self.vault
            .get(path)
            .cloned()
            .ok_or_else(|| KvError::NotFound {
                store: KvStore::Vault,
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_preset_values() {
        let resolver = MockResolver::new()
            .consul_key("app/port", "8080")
            .vault_secret("secret/data/app", json!({"password": "hunter2"}));

        assert_eq!(resolver.consul_get("app/port").await.unwrap(), "8080");
        let doc = resolver.vault_read("secret/data/app").await.unwrap();
        assert_eq!(doc["password"], "hunter2");
        assert_eq!(resolver.query_count("consul", "app/port"), 1);
    }

    #[tokio::test]
    async fn test_missing_preset_is_not_found() {
        let resolver = MockResolver::new();
        let err = resolver.consul_get("nope").await.unwrap_err();
        assert!(matches!(err, KvError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deny_all() {
        let resolver = MockResolver::new().consul_key("app/port", "8080").deny_all();
        let err = resolver.consul_get("app/port").await.unwrap_err();
        assert!(matches!(err, KvError::Auth { .. }));
    }
}
