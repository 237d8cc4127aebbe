//! In-memory cache storage.
//!
//! Backs the cache port for tests and for embedders without a host-provided
//! cache. Entries are keyed by method plus URL; `add_all` fetches each URL
//! through the supplied fetch client, mirroring how a host cache warms
//! itself.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bytes::Bytes;
use eyre::Result;
use http::{Method, Request, Response};

use crate::{
    core::context::{clone_request, clone_response},
    ports::{
        cache_store::{Cache, CacheStorage},
        fetch_client::FetchClient,
    },
};

/// One named in-memory cache.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Response<Bytes>>>,
    fetch_client: Arc<dyn FetchClient>,
}

fn entry_key(method: &Method, uri: &http::Uri) -> String {
    format!("{method} {uri}")
}

#[async_trait]
impl Cache for MemoryCache {
    async fn match_request(&self, request: &Request<Bytes>) -> Result<Option<Response<Bytes>>> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        Ok(entries
            .get(&entry_key(request.method(), request.uri()))
            .map(clone_response))
    }

    async fn put(&self, request: &Request<Bytes>, response: Response<Bytes>) -> Result<()> {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(entry_key(request.method(), request.uri()), response);
        Ok(())
    }

    async fn add_all(&self, urls: &[String]) -> Result<()> {
        for url in urls {
            let request = Request::builder()
                .method(Method::GET)
                .uri(url)
                .body(Bytes::new())?;
            let response = self.fetch_client.fetch(clone_request(&request)).await?;
            self.put(&request, response).await?;
        }
        Ok(())
    }
}

/// The collection of named in-memory caches.
pub struct MemoryCacheStorage {
    caches: Mutex<HashMap<String, Arc<MemoryCache>>>,
    fetch_client: Arc<dyn FetchClient>,
}

impl MemoryCacheStorage {
    pub fn new(fetch_client: Arc<dyn FetchClient>) -> Self {
        Self {
            caches: Mutex::new(HashMap::new()),
            fetch_client,
        }
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, key: &str) -> Result<Arc<dyn Cache>> {
        let mut caches = self.caches.lock().expect("cache storage lock poisoned");
        let cache = caches.entry(key.to_string()).or_insert_with(|| {
            Arc::new(MemoryCache {
                entries: Mutex::new(HashMap::new()),
                fetch_client: Arc::clone(&self.fetch_client),
            })
        });
        let cache: Arc<dyn Cache> = Arc::clone(cache);
        Ok(cache)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let caches = self.caches.lock().expect("cache storage lock poisoned");
        Ok(caches.keys().cloned().collect())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut caches = self.caches.lock().expect("cache storage lock poisoned");
        Ok(caches.remove(key).is_some())
    }
}
