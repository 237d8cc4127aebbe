//! Ports (interfaces) for the collaborators the core depends on.
pub mod cache_store;
pub mod events;
pub mod fetch_client;

pub use cache_store::{Cache, CacheStorage};
pub use events::{EventResponder, FetchEvent};
pub use fetch_client::{FetchClient, FetchError, FetchResult};
