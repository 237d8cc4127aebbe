//! Service registration surface.
use std::{collections::HashMap, sync::Arc};

use crate::core::services::descriptor::{
    ServiceDescriptor, ServiceFactory, ServiceInstance, ServiceLifetime,
};

/// Accumulates service registrations during startup configuration.
///
/// Registration is keyed by name; registering the same key twice overwrites
/// the earlier descriptor.
#[derive(Default)]
pub struct ServiceCollection {
    descriptors: HashMap<String, ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service instantiated fresh on every resolution.
    pub fn add_transient<T, F>(&mut self, key: impl Into<String>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.add_descriptor_for(key, ServiceLifetime::Transient, factory);
    }

    /// Register a service instantiated once per request scope.
    pub fn add_scoped<T, F>(&mut self, key: impl Into<String>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.add_descriptor_for(key, ServiceLifetime::Scoped, factory);
    }

    /// Register a service instantiated once for the process lifetime.
    pub fn add_singleton<T, F>(&mut self, key: impl Into<String>, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.add_descriptor_for(key, ServiceLifetime::Singleton, factory);
    }

    /// Register a fixed configuration value, available to middleware as a
    /// singleton under `options_name`.
    pub fn configure<T>(&mut self, options_name: impl Into<String>, options: T)
    where
        T: Send + Sync + 'static,
    {
        let instance: ServiceInstance = Arc::new(options);
        let factory: ServiceFactory = Arc::new(move || Some(Arc::clone(&instance)));
        self.add_descriptor(ServiceDescriptor::new(
            options_name,
            ServiceLifetime::Singleton,
            factory,
        ));
    }

    /// Register a raw descriptor. The factory may return `None`, which the
    /// resolver reports as a null-instance error.
    pub fn add_descriptor(&mut self, descriptor: ServiceDescriptor) {
        self.descriptors.insert(descriptor.key.clone(), descriptor);
    }

    /// Snapshot the registrations for a resolver.
    pub fn into_descriptors(self) -> Arc<HashMap<String, ServiceDescriptor>> {
        Arc::new(self.descriptors)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn add_descriptor_for<T, F>(&mut self, key: impl Into<String>, lifetime: ServiceLifetime, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let key = key.into();
        let factory: ServiceFactory = Arc::new(move || {
            let instance: ServiceInstance = Arc::new(factory());
            Some(instance)
        });
        self.add_descriptor(ServiceDescriptor::new(key, lifetime, factory));
    }
}
