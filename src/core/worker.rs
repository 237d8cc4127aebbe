//! Worker host orchestration.
//!
//! The [`WorkerBuilder`] wires configuration, startup-registered services and
//! the middleware pipeline into a [`WorkerHost`]. The host owns the shared
//! singleton store, fires the one-time install/activate events and turns each
//! inbound fetch event into a fresh request scope.
//!
//! Per-request failures are caught here, at the outermost dispatch boundary:
//! the event is still resolved with a direct pass-through fetch and the error
//! goes to the log, never across requests or into singleton state.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
    time::Instant,
};

use bytes::Bytes;
use eyre::{Result, eyre};
use http::{Request, Response, StatusCode};
use tracing::Instrument;

use crate::{
    config::{models::WorkerConfig, validation::WorkerConfigValidator},
    core::{
        context::{FetchContext, LogLevel, ResponderSlot, clone_request},
        lifecycle::ApplicationLifetime,
        pipeline::{PipelineBuilder, RequestDelegate},
        services::{
            InstanceStore, ServiceCollection, ServiceDescriptor, ServiceFactory, ServiceInstance,
            ServiceLifetime, ServiceProvider,
        },
    },
    ports::{events::FetchEvent, fetch_client::FetchClient},
    tracing_setup::{create_lifecycle_span, create_request_span},
};

/// Service key under which the host registers the [`ApplicationLifetime`].
pub const APPLICATION_LIFETIME_KEY: &str = "ApplicationLifetime";

/// Startup defines the services and the fetch pipeline of a worker.
///
/// Registration order inside `configure` is execution order at request time.
pub trait Startup: Send + Sync {
    /// Register services; the default registers nothing.
    fn configure_services(&self, _services: &mut ServiceCollection) {}

    /// Build the request pipeline.
    fn configure(&self, app: &mut PipelineBuilder) -> Result<()>;
}

/// Entry point to the worker building process.
pub struct WorkerBuilder {
    config: WorkerConfig,
    fetch_client: Arc<dyn FetchClient>,
    startup: Option<Box<dyn Startup>>,
}

impl WorkerBuilder {
    pub fn new(config: WorkerConfig, fetch_client: Arc<dyn FetchClient>) -> Self {
        Self {
            config,
            fetch_client,
            startup: None,
        }
    }

    /// Indicate which startup builds the services and fetch pipeline.
    pub fn use_startup(mut self, startup: impl Startup + 'static) -> Self {
        self.startup = Some(Box::new(startup));
        self
    }

    /// Validate the configuration, run the startup and produce a host.
    ///
    /// Configuration problems (missing startup, invalid config, malformed
    /// route patterns registered by `configure`) fail here, before any
    /// request is handled.
    pub fn build(self) -> Result<WorkerHost> {
        let startup = self
            .startup
            .ok_or_else(|| eyre!("a startup must be supplied before build is called; see use_startup"))?;

        WorkerConfigValidator::validate(&self.config)?;
        let config = Arc::new(self.config);

        let lifetime = Arc::new(ApplicationLifetime::new());
        let mut services = ServiceCollection::new();
        let lifetime_instance: ServiceInstance = Arc::clone(&lifetime);
        let lifetime_factory: ServiceFactory =
            Arc::new(move || Some(Arc::clone(&lifetime_instance)));
        services.add_descriptor(ServiceDescriptor::new(
            APPLICATION_LIFETIME_KEY,
            ServiceLifetime::Singleton,
            lifetime_factory,
        ));

        startup.configure_services(&mut services);
        let descriptors = services.into_descriptors();
        let singletons: InstanceStore = Arc::new(Mutex::new(HashMap::new()));

        let app_services = ServiceProvider::new(Arc::clone(&descriptors), Arc::clone(&singletons));
        let mut app = PipelineBuilder::new(
            Arc::clone(&config),
            app_services,
            Arc::clone(&self.fetch_client),
        );
        startup.configure(&mut app)?;

        Ok(WorkerHost {
            config,
            descriptors,
            singletons,
            lifetime,
            pipeline: app,
            delegate: RwLock::new(None),
            fetch_client: self.fetch_client,
        })
    }
}

/// A configured worker ready to receive lifecycle and fetch events.
pub struct WorkerHost {
    config: Arc<WorkerConfig>,
    descriptors: Arc<HashMap<String, ServiceDescriptor>>,
    singletons: InstanceStore,
    lifetime: Arc<ApplicationLifetime>,
    pipeline: PipelineBuilder,
    delegate: RwLock<Option<RequestDelegate>>,
    fetch_client: Arc<dyn FetchClient>,
}

impl WorkerHost {
    pub fn config(&self) -> &Arc<WorkerConfig> {
        &self.config
    }

    pub fn lifetime(&self) -> &Arc<ApplicationLifetime> {
        &self.lifetime
    }

    /// Fire the one-time install event.
    pub async fn install(&self) {
        self.lifetime
            .install_source()
            .fire()
            .instrument(create_lifecycle_span("install", &self.config.version))
            .await;
    }

    /// Fire the one-time activate event and fold the pipeline into the
    /// request delegate. Fetch events arriving before activation resolve via
    /// pass-through.
    pub async fn activate(&self) {
        self.lifetime
            .activate_source()
            .fire()
            .instrument(create_lifecycle_span("activate", &self.config.version))
            .await;

        let delegate = self.pipeline.build();
        *self
            .delegate
            .write()
            .expect("delegate lock poisoned") = Some(delegate);
    }

    /// Handle one inbound fetch event.
    ///
    /// Each event gets its own request scope over the shared singleton
    /// store. The event always resolves: pipeline errors fall through to a
    /// direct network fetch.
    pub async fn handle_fetch(&self, event: FetchEvent) {
        let services = ServiceProvider::new(Arc::clone(&self.descriptors), Arc::clone(&self.singletons));
        let fallback_request = clone_request(&event.request);
        let ctx = FetchContext::new(event, services);
        let request_id = ctx.request_id;
        let responder_slot = ctx.responder_slot();

        let delegate = {
            self.delegate
                .read()
                .expect("delegate lock poisoned")
                .clone()
        };
        let Some(delegate) = delegate else {
            tracing::error!(
                request_id = %request_id,
                "fetch event received before activation; resolving with pass-through fetch"
            );
            self.passthrough(fallback_request, responder_slot).await;
            return;
        };

        let started = Instant::now();
        match delegate(ctx).await {
            Ok(mut ctx) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
                ctx.log(LogLevel::Info, format!("time elapsed: {elapsed_ms:.2} ms"));
                self.flush_logs(&ctx, elapsed_ms);
            }
            Err(error) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %error,
                    "request pipeline failed; resolving event with pass-through fetch"
                );
                self.passthrough(fallback_request, responder_slot).await;
            }
        }
    }

    /// Resolve an event outside the pipeline with a plain network fetch.
    async fn passthrough(&self, request: Request<Bytes>, responder_slot: ResponderSlot) {
        let responder = responder_slot
            .lock()
            .expect("responder slot lock poisoned")
            .take();
        let Some(responder) = responder else {
            // The pipeline already answered before failing.
            return;
        };

        match self.fetch_client.fetch(request).await {
            Ok(response) => responder.respond(response),
            Err(error) => {
                tracing::error!(error = %error, "pass-through fetch failed");
                let response = Response::builder()
                    .status(StatusCode::BAD_GATEWAY)
                    .body(Bytes::new())
                    .expect("static response parts are valid");
                responder.respond(response);
            }
        }
    }

    /// Emit the request's buffered log entries as one grouped span,
    /// filtered by the configured level.
    fn flush_logs(&self, ctx: &FetchContext, elapsed_ms: f64) {
        let threshold = self.config.effective_log_level();
        let entries: Vec<_> = ctx
            .log_entries()
            .iter()
            .filter(|entry| entry.level >= threshold)
            .collect();
        if entries.is_empty() {
            return;
        }

        let span = create_request_span(
            ctx.request.method().as_str(),
            &ctx.request.uri().to_string(),
            &ctx.request_id.to_string(),
        );
        span.record("duration_ms", elapsed_ms);
        if let Some(response) = &ctx.response {
            span.record("http.status_code", response.status().as_u16());
        }
        let _guard = span.enter();
        for entry in entries {
            match entry.level {
                LogLevel::Debug => tracing::debug!("{}", entry.message),
                LogLevel::Info => tracing::info!("{}", entry.message),
                LogLevel::Warn => tracing::warn!("{}", entry.message),
                LogLevel::Error => tracing::error!("{}", entry.message),
            }
        }
    }
}
