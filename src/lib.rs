//! Dendrite - request routing and middleware pipelines for intercepted requests.
//!
//! Dendrite is the request-handling core of an event-driven worker process:
//! requests arrive as already-parsed events from the embedding host, flow
//! through an ordered middleware pipeline and resolve to a response without a
//! listening socket anywhere in sight. It grew out of the service-worker
//! model of request interception and keeps its three load-bearing pieces
//! tightly coupled and everything else behind interfaces.
//!
//! # Features
//! - URL pattern routes with variables (`{name}`), single-segment wildcards
//!   (`*`), greedy-tail double wildcards (`**`), file-extension and
//!   query-parameter matchers
//! - Ordered middleware pipelines with conditional branches (`map`,
//!   `map_when`, `use_when`) built from cloned, isolated builders
//! - Keyed service resolution with transient, scoped (per-request) and
//!   singleton lifetimes
//! - One-time install/activate lifecycle tokens with per-handler failure
//!   isolation
//! - Cache warm-up and eviction hooks over an opaque cache-storage port
//! - Structured tracing via `tracing`, buffered per-request and flushed as
//!   one group
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use dendrite::{
//!     adapters::ReqwestFetchClient,
//!     config::WorkerConfig,
//!     core::{PipelineBuilder, Startup, WorkerBuilder},
//! };
//!
//! struct AppStartup;
//!
//! impl Startup for AppStartup {
//!     fn configure(&self, app: &mut PipelineBuilder) -> eyre::Result<()> {
//!         app.map("/api/{controller}/{action}", |api| {
//!             // configure the branch pipeline here
//!             let _ = api;
//!         })?;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> eyre::Result<()> {
//! let config = WorkerConfig::new("1.0.0", "https://www.example.com");
//! let host = WorkerBuilder::new(config, Arc::new(ReqwestFetchClient::new()))
//!     .use_startup(AppStartup)
//!     .build()?;
//! // host.install().await / host.activate().await / host.handle_fetch(event).await
//! # let _ = host;
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters** (implementations)
//! while keeping business logic inside `core`. The host environment supplies
//! events and a cache; dendrite supplies routing, composition and scoping.
//!
//! # Error Handling
//! Fallible APIs return `eyre::Result<T>` or a domain specific error type
//! (`RouteError`, `ServiceResolveError`, `LifecycleError`). Configuration
//! problems surface at build time; per-request failures are contained at the
//! dispatch boundary and the event still resolves.
//!
//! # Concurrency
//! Requests are handled as interleaved async tasks. Every request owns its
//! scoped service store, so no synchronization is needed between in-flight
//! requests; singleton instances are shared and must be internally race-safe.
//!
//! # License
//! Licensed under Apache-2.0.
pub mod config;
pub mod ports;
pub mod tracing_setup;

// These modules are implementation details and should not be directly used by users
pub mod adapters;
pub mod core;

// Re-export the specific types most embedders need
pub use crate::{
    adapters::{MemoryCacheStorage, ReqwestFetchClient, channel_event},
    config::models::WorkerConfig,
    core::{
        FetchContext, LogLevel, PipelineBuilder, Route, RouteSettings, RouteVariables,
        ServiceCollection, Startup, WorkerBuilder, WorkerHost, delegate,
    },
    ports::{events::FetchEvent, fetch_client::FetchClient},
};
