//! Cache storage port.
//!
//! An opaque key-value cache supplied by the host. Caching strategies build
//! on these traits; the routing, pipeline and service-resolution core never
//! touches them directly.
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use eyre::Result;
use http::{Request, Response};

/// One named cache.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up a stored response for a request.
    async fn match_request(&self, request: &Request<Bytes>) -> Result<Option<Response<Bytes>>>;

    /// Store a response under a request.
    async fn put(&self, request: &Request<Bytes>, response: Response<Bytes>) -> Result<()>;

    /// Fetch and store every listed URL.
    async fn add_all(&self, urls: &[String]) -> Result<()>;
}

/// The collection of named caches.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open (creating if needed) the cache stored under `key`.
    async fn open(&self, key: &str) -> Result<Arc<dyn Cache>>;

    /// List the keys of all caches.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Delete the cache stored under `key`; returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;
}
