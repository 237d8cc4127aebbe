//! Service resolution with per-request and process-wide stores.
//!
//! A provider owns a fresh scoped store and borrows a shared singleton
//! store, so independent per-request providers still converge on the same
//! singleton instances. Resolution failures are programmer errors surfaced
//! immediately; they are never retried.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use thiserror::Error;

use crate::core::services::descriptor::{ServiceDescriptor, ServiceInstance, ServiceLifetime};

/// Store shared between providers (scoped within one, singletons across all).
pub type InstanceStore = Arc<Mutex<HashMap<String, ServiceInstance>>>;

/// Service resolution failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceResolveError {
    /// The key was never registered.
    #[error("no service registered under key '{0}'")]
    NotFound(String),

    /// The factory produced nothing.
    #[error("service factory for key '{0}' produced a null instance")]
    NullInstance(String),

    /// The stored instance is not of the requested type.
    #[error("service '{0}' is not of the requested type")]
    WrongType(String),
}

/// Resolves service instances according to their registered lifetimes.
///
/// Cloning a provider shares both stores; construct a new provider per
/// inbound request to get a fresh scope.
#[derive(Clone)]
pub struct ServiceProvider {
    descriptors: Arc<HashMap<String, ServiceDescriptor>>,
    scoped: InstanceStore,
    singletons: InstanceStore,
}

impl ServiceProvider {
    /// Create a provider with a fresh scoped store over a shared singleton
    /// store.
    pub fn new(
        descriptors: Arc<HashMap<String, ServiceDescriptor>>,
        singletons: InstanceStore,
    ) -> Self {
        Self {
            descriptors,
            scoped: Arc::new(Mutex::new(HashMap::new())),
            singletons,
        }
    }

    /// Resolve an instance by key.
    pub fn get(&self, key: &str) -> Result<ServiceInstance, ServiceResolveError> {
        let descriptor = self
            .descriptors
            .get(key)
            .ok_or_else(|| ServiceResolveError::NotFound(key.to_string()))?;

        let store = match descriptor.lifetime {
            ServiceLifetime::Transient => None,
            ServiceLifetime::Scoped => Some(&self.scoped),
            ServiceLifetime::Singleton => Some(&self.singletons),
        };

        match store {
            None => (descriptor.factory)()
                .ok_or_else(|| ServiceResolveError::NullInstance(key.to_string())),
            Some(store) => {
                {
                    let store = store.lock().expect("service store lock poisoned");
                    if let Some(instance) = store.get(key) {
                        return Ok(Arc::clone(instance));
                    }
                }
                // The factory runs outside the lock so it may itself resolve
                // services from the same store.
                let instance = (descriptor.factory)()
                    .ok_or_else(|| ServiceResolveError::NullInstance(key.to_string()))?;
                let mut store = store.lock().expect("service store lock poisoned");
                let instance = store
                    .entry(key.to_string())
                    .or_insert(instance);
                Ok(Arc::clone(instance))
            }
        }
    }

    /// Resolve and downcast to a concrete type.
    pub fn get_as<T: Send + Sync + 'static>(
        &self,
        key: &str,
    ) -> Result<Arc<T>, ServiceResolveError> {
        self.get(key)?
            .downcast::<T>()
            .map_err(|_| ServiceResolveError::WrongType(key.to_string()))
    }

    /// Discard scoped instances, keeping singletons intact.
    pub fn reset_scope(&self) {
        self.scoped
            .lock()
            .expect("service store lock poisoned")
            .clear();
    }
}
