//! Keyed service registry with transient, scoped and singleton lifetimes.
pub mod collection;
pub mod descriptor;
pub mod provider;

pub use collection::ServiceCollection;
pub use descriptor::{ServiceDescriptor, ServiceFactory, ServiceInstance, ServiceLifetime};
pub use provider::{InstanceStore, ServiceProvider, ServiceResolveError};
