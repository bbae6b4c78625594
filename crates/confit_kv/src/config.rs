//! Connection configuration for Consul and Vault.

use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection parameters for the KV stores.
///
/// Addresses and tokens are optional: a template that only uses `key`
/// directives needs no Vault configuration and vice versa. Tokens are
/// supplied by the caller (CLI flags or environment), never hardcoded.
#[derive(Debug, Clone)]
pub struct KvConfig {
    pub consul_addr: Option<String>,
    pub consul_token: Option<String>,
    pub vault_addr: Option<String>,
    pub vault_token: Option<String>,
    /// Per-request timeout applied to every store call.
    pub timeout: Duration,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            consul_addr: None,
            consul_token: None,
            vault_addr: None,
            vault_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl KvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consul_addr(mut self, addr: impl Into<String>) -> Self {
        self.consul_addr = Some(addr.into());
        self
    }

    pub fn consul_token(mut self, token: impl Into<String>) -> Self {
        self.consul_token = Some(token.into());
        self
    }

    pub fn vault_addr(mut self, addr: impl Into<String>) -> Self {
        self.vault_addr = Some(addr.into());
        self
    }

    pub fn vault_token(mut self, token: impl Into<String>) -> Self {
        self.vault_token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check whether any store is configured at all.
    pub fn has_store(&self) -> bool {
        self.consul_addr.is_some() || self.vault_addr.is_some()
    }
}

/// Join a base address and an API path, normalizing slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
