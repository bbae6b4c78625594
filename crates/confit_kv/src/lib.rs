//! Consul and Vault key-value access for confit.
//!
//! This crate owns the "query-and-resolve" seam: the [`KvResolver`] trait,
//! the HTTP clients behind [`HttpResolver`], and a [`mock::MockResolver`]
//! for tests. It never implements the stores' wire protocols beyond their
//! public HTTP APIs.

pub mod config;
pub mod consul;
pub mod error;
pub mod mock;
pub mod resolver;
pub mod vault;

pub use config::KvConfig;
pub use consul::ConsulClient;
pub use error::{KvError, KvResult, KvStore};
pub use resolver::{HttpResolver, KvResolver};
pub use vault::VaultClient;
