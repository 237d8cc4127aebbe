pub mod events;
pub mod fetch;
pub mod memory_cache;

/// Re-export commonly used types from adapters
pub use events::{ChannelResponder, channel_event};
pub use fetch::ReqwestFetchClient;
pub use memory_cache::{MemoryCache, MemoryCacheStorage};
