//! Cache-related builder extensions.
//!
//! These hang precache and cache-eviction work off the one-time lifecycle
//! tokens rather than the request pipeline: installing warms a named cache,
//! activating drops caches left behind by earlier versions.
use std::sync::Arc;

use eyre::Result;
use tracing::debug;

use crate::{
    core::{lifecycle::ApplicationLifetime, pipeline::PipelineBuilder, worker::APPLICATION_LIFETIME_KEY},
    ports::cache_store::CacheStorage,
};

impl PipelineBuilder {
    /// Precache `urls` under `key` (defaulting to the configured version)
    /// when the install event fires.
    pub fn use_install_cache(
        &mut self,
        caches: Arc<dyn CacheStorage>,
        urls: Vec<String>,
        key: Option<String>,
    ) -> Result<&mut Self> {
        let key = key.unwrap_or_else(|| self.config().version.clone());
        let lifetime = self
            .services()
            .get_as::<ApplicationLifetime>(APPLICATION_LIFETIME_KEY)?;

        lifetime.installing.register(move || {
            let caches = Arc::clone(&caches);
            let key = key.clone();
            let urls = urls.clone();
            async move {
                debug!(cache_key = %key, count = urls.len(), "precaching files on install");
                let cache = caches.open(&key).await?;
                cache.add_all(&urls).await
            }
        })?;

        Ok(self)
    }

    /// Delete every cache whose key is not in `keys_to_keep` (defaulting to
    /// just the configured version) when the activate event fires.
    pub fn use_clear_cache_on_update(
        &mut self,
        caches: Arc<dyn CacheStorage>,
        keys_to_keep: Option<Vec<String>>,
    ) -> Result<&mut Self> {
        let keys_to_keep = keys_to_keep.unwrap_or_else(|| vec![self.config().version.clone()]);
        let lifetime = self
            .services()
            .get_as::<ApplicationLifetime>(APPLICATION_LIFETIME_KEY)?;

        lifetime.activating.register(move || {
            let caches = Arc::clone(&caches);
            let keys_to_keep = keys_to_keep.clone();
            async move {
                debug!("clearing unused cache entries");
                for key in caches.keys().await? {
                    if !keys_to_keep.contains(&key) {
                        debug!(cache_key = %key, "deleting stale cache");
                        caches.delete(&key).await?;
                    }
                }
                Ok(())
            }
        })?;

        Ok(self)
    }
}
