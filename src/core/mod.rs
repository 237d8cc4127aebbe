//! Core business logic: URL decomposition, route matching, pipeline
//! composition, service resolution and the worker host. This layer performs
//! no I/O of its own; the network and the cache are reached through ports.
pub mod context;
pub mod lifecycle;
pub mod pipeline;
pub mod route;
pub mod services;
pub mod url_parts;
pub mod worker;

pub use context::{FetchContext, LogEntry, LogLevel};
pub use lifecycle::{ApplicationLifetime, EventToken, EventTokenSource, LifecycleError};
pub use pipeline::{PipelineBuilder, RequestDelegate, delegate};
pub use route::{Route, RouteError, RouteSettings, RouteVariables};
pub use services::{ServiceCollection, ServiceLifetime, ServiceProvider, ServiceResolveError};
pub use url_parts::UrlParts;
pub use worker::{APPLICATION_LIFETIME_KEY, Startup, WorkerBuilder, WorkerHost};
