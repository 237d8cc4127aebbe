//! Middleware pipeline construction and dispatch.
pub mod builder;
pub mod cache_ext;
pub mod map;

use std::{future::Future, sync::Arc};

use eyre::Result;
use futures_util::future::BoxFuture;

use crate::core::context::FetchContext;

/// The future a request handler resolves to.
pub type HandlerFuture = BoxFuture<'static, Result<FetchContext>>;

/// One executable link of the pipeline. Takes ownership of the context and
/// returns it (possibly mutated) when the rest of the chain is done.
pub type RequestDelegate = Arc<dyn Fn(FetchContext) -> HandlerFuture + Send + Sync>;

/// A middleware: wraps the `next` delegate and yields the composed delegate.
pub type MiddlewareFactory = Arc<dyn Fn(RequestDelegate) -> RequestDelegate + Send + Sync>;

/// Lift an async closure into a [`RequestDelegate`].
pub fn delegate<F, Fut>(handler: F) -> RequestDelegate
where
    F: Fn(FetchContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FetchContext>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(handler(ctx)))
}

pub use builder::PipelineBuilder;
pub use map::{RoutePaths, RoutePredicate};
