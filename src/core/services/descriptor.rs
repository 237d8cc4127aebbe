//! Service descriptors and lifetimes.
use std::{any::Any, fmt, sync::Arc};

/// A resolved service instance. Stored type-erased; callers downcast through
/// [`crate::core::services::ServiceProvider::get_as`].
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

/// Factory invoked by the resolver. Returning `None` models a factory that
/// produced nothing, which the resolver surfaces as a null-instance error.
pub type ServiceFactory = Arc<dyn Fn() -> Option<ServiceInstance> + Send + Sync>;

/// How long a resolved instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// New instance on every resolution.
    Transient,
    /// One instance per request scope.
    Scoped,
    /// One instance for the life of the process.
    Singleton,
}

/// Describes one registered service.
#[derive(Clone)]
pub struct ServiceDescriptor {
    pub key: String,
    pub lifetime: ServiceLifetime,
    pub factory: ServiceFactory,
}

impl ServiceDescriptor {
    pub fn new(
        key: impl Into<String>,
        lifetime: ServiceLifetime,
        factory: ServiceFactory,
    ) -> Self {
        Self {
            key: key.into(),
            lifetime,
            factory,
        }
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
