//! Ordered middleware composition.
//!
//! The builder accumulates middleware factories and folds them right-to-left
//! around a terminal default handler, so that execution order at request time
//! equals registration order. Conditional branches (`map`, `use_when`) are
//! configured on a clone and grafted back as a single middleware, which keeps
//! branch registration isolated from the parent sequence.
use std::{any::Any, collections::HashMap, future::Future, sync::Arc};

use eyre::Result;

use crate::{
    config::models::WorkerConfig,
    core::{
        context::{FetchContext, LogLevel, clone_request},
        pipeline::{HandlerFuture, MiddlewareFactory, RequestDelegate},
        services::ServiceProvider,
    },
    ports::fetch_client::FetchClient,
};

/// Builds one executable request delegate out of ordered middleware.
pub struct PipelineBuilder {
    components: Vec<MiddlewareFactory>,
    default_delegate: RequestDelegate,
    properties: HashMap<String, Arc<dyn Any + Send + Sync>>,
    config: Arc<WorkerConfig>,
    services: ServiceProvider,
}

impl PipelineBuilder {
    /// Create a builder whose terminal handler forwards the request
    /// unmodified to the network through `fetch_client`.
    pub fn new(
        config: Arc<WorkerConfig>,
        services: ServiceProvider,
        fetch_client: Arc<dyn FetchClient>,
    ) -> Self {
        let default_delegate: RequestDelegate = Arc::new(move |mut ctx: FetchContext| -> HandlerFuture {
            let fetch_client = Arc::clone(&fetch_client);
            Box::pin(async move {
                ctx.log(LogLevel::Debug, "default handler: forwarding to the network");
                let request = clone_request(&ctx.request);
                let response = fetch_client.fetch(request).await?;
                ctx.respond(response);
                Ok(ctx)
            })
        });

        Self {
            components: Vec::new(),
            default_delegate,
            properties: HashMap::new(),
            config,
            services,
        }
    }

    /// The configuration this pipeline was built against.
    pub fn config(&self) -> &Arc<WorkerConfig> {
        &self.config
    }

    /// The application-level service resolver.
    pub fn services(&self) -> &ServiceProvider {
        &self.services
    }

    /// Stash a value for other middleware authors configuring this builder.
    pub fn set_property<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.properties.insert(key.into(), Arc::new(value));
    }

    /// Read back a value stashed with [`PipelineBuilder::set_property`].
    pub fn get_property<T: Send + Sync + 'static>(&self, key: &str) -> Option<Arc<T>> {
        self.properties
            .get(key)
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Append a middleware. Middleware run in registration order; each one
    /// decides whether and when to invoke the next link.
    pub fn use_middleware<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn(RequestDelegate) -> RequestDelegate + Send + Sync + 'static,
    {
        self.components.push(Arc::new(factory));
        self
    }

    /// Append a pass-through middleware written as `(ctx, next) -> future`.
    pub fn use_next<F, Fut>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(FetchContext, RequestDelegate) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FetchContext>> + Send + 'static,
    {
        let middleware = Arc::new(middleware);
        self.use_middleware(move |next: RequestDelegate| {
            let middleware = Arc::clone(&middleware);
            Arc::new(move |ctx: FetchContext| -> HandlerFuture {
                Box::pin(middleware(ctx, Arc::clone(&next)))
            })
        })
    }

    /// Append a terminal handler that never calls the rest of the chain.
    pub fn run(&mut self, handler: RequestDelegate) -> &mut Self {
        self.use_middleware(move |_next| Arc::clone(&handler))
    }

    /// Fold the registered middleware right-to-left around the default
    /// handler: the first-registered middleware runs first at request time.
    pub fn build(&self) -> RequestDelegate {
        let mut app = Arc::clone(&self.default_delegate);
        for component in self.components.iter().rev() {
            app = component(app);
        }
        app
    }

    /// Run a branch when `predicate` passes, falling through to whatever
    /// comes after this registration in the parent pipeline otherwise.
    ///
    /// The branch is configured on a clone of this builder and terminates in
    /// the parent's `next`, not in the parent's default handler. The parent's
    /// `next` only exists once the parent folds, so the branch is finished
    /// inside the middleware factory, from a duplicate that keeps the
    /// configured components (`Clone` would start it empty).
    pub fn use_when<P, F>(&mut self, predicate: P, configure: F) -> &mut Self
    where
        P: Fn(&FetchContext) -> bool + Send + Sync + 'static,
        F: FnOnce(&mut PipelineBuilder),
    {
        let mut branch_template = self.clone();
        configure(&mut branch_template);
        let predicate = Arc::new(predicate);

        self.use_middleware(move |next: RequestDelegate| {
            let mut branch_builder = branch_template.duplicate();
            branch_builder.run(Arc::clone(&next));
            let branch = branch_builder.build();
            let predicate = Arc::clone(&predicate);

            Arc::new(move |ctx: FetchContext| {
                if predicate(&ctx) {
                    branch(ctx)
                } else {
                    next(ctx)
                }
            })
        })
    }

    /// Duplicate this builder including its registered components. `Clone`
    /// deliberately resets the component list for branch isolation; this is
    /// for carrying an already-configured branch into its factory.
    fn duplicate(&self) -> Self {
        Self {
            components: self.components.clone(),
            default_delegate: Arc::clone(&self.default_delegate),
            properties: self.properties.clone(),
            config: Arc::clone(&self.config),
            services: self.services.clone(),
        }
    }
}

impl Clone for PipelineBuilder {
    /// Branch isolation: a fresh, empty middleware sequence and a shallow
    /// copy of the property bag (values Arc-shared, not deep-cloned) over
    /// the same default handler, config and services.
    fn clone(&self) -> Self {
        Self {
            components: Vec::new(),
            default_delegate: Arc::clone(&self.default_delegate),
            properties: self.properties.clone(),
            config: Arc::clone(&self.config),
            services: self.services.clone(),
        }
    }
}
