//! Key-value store client for Herald.
//!
//! This crate provides the narrow seam through which published image metadata
//! reaches the distributed store: a put-only [`KvStore`] trait, scoped per
//! call to a datacenter, and an HTTP backend speaking the Consul-compatible
//! `/v1/kv` REST API.

pub mod config;
pub mod http;

pub use config::KvConfig;
pub use http::HttpKv;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("store connect error: {0}")]
    Connect(String),
    #[error("store HTTP error: {0}")]
    Http(String),
    #[error("store returned HTTP {code} for {url}")]
    Status { code: u16, url: String },
}

/// Trait for key-value store backends.
///
/// Writes are independent of each other; there is no transaction spanning
/// multiple keys. The datacenter scopes a single write and is supplied per
/// call because the publisher addresses a different datacenter per region.
pub trait KvStore: Send + Sync {
    /// Write one key. Overwrites any existing value.
    fn put(&self, datacenter: &str, key: &str, value: &[u8]) -> Result<(), KvError>;
}
