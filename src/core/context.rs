//! Per-request context flowing through the pipeline.
//!
//! A [`FetchContext`] is created fresh for every inbound event and owned by
//! the delegate chain; middleware receive it, may mutate it and hand it to
//! the next link. Its scoped service store and log entries are discarded when
//! the request finishes, while the singleton store behind `services` is
//! shared process-wide.
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{Request, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    core::services::ServiceProvider,
    ports::events::{EventResponder, FetchEvent},
};

/// Severity of an in-context log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One buffered log line, flushed by the host after the request completes.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Shared slot holding the event responder until someone answers the event.
///
/// The host keeps a handle so it can still resolve the event with a
/// pass-through response when the pipeline fails.
pub type ResponderSlot = Arc<Mutex<Option<Box<dyn EventResponder>>>>;

/// Mutable per-request state.
pub struct FetchContext {
    /// The intercepted request.
    pub request: Request<Bytes>,
    /// The response produced so far, if any.
    pub response: Option<Response<Bytes>>,
    /// Resolver bound to this request's scope.
    pub services: ServiceProvider,
    /// Correlates every log line emitted for this request.
    pub request_id: Uuid,
    responder: ResponderSlot,
    log_entries: Vec<LogEntry>,
}

impl FetchContext {
    /// Wrap an inbound event, binding it to a request-scoped resolver.
    pub fn new(event: FetchEvent, services: ServiceProvider) -> Self {
        Self {
            request: event.request,
            response: None,
            services,
            request_id: Uuid::new_v4(),
            responder: Arc::new(Mutex::new(Some(event.responder))),
            log_entries: Vec::new(),
        }
    }

    /// Handle to the responder slot, used by the host for error fallback.
    pub fn responder_slot(&self) -> ResponderSlot {
        Arc::clone(&self.responder)
    }

    /// Buffer a log line against this request.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_entries.push(LogEntry {
            level,
            message: message.into(),
            at: Utc::now(),
        });
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        &self.log_entries
    }

    /// Deliver the response for this event.
    ///
    /// The first call forwards to the host responder; later calls only
    /// replace the stored response, since an event can be answered once.
    pub fn respond(&mut self, response: Response<Bytes>) {
        if let Some(responder) = self
            .responder
            .lock()
            .expect("responder slot lock poisoned")
            .take()
        {
            responder.respond(clone_response(&response));
        } else {
            self.log(
                LogLevel::Warn,
                "response already delivered for this event; keeping the latest response in context",
            );
        }
        self.response = Some(response);
    }
}

/// Rebuild a request from its parts. `http` request bodies are not `Clone`,
/// but `Bytes` bodies are cheap to duplicate.
pub fn clone_request(request: &Request<Bytes>) -> Request<Bytes> {
    let mut builder = Request::builder()
        .method(request.method().clone())
        .uri(request.uri().clone())
        .version(request.version());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(request.headers().clone());
    }
    builder
        .body(request.body().clone())
        .expect("rebuilding a request from valid parts cannot fail")
}

/// Rebuild a response from its parts.
pub fn clone_response(response: &Response<Bytes>) -> Response<Bytes> {
    let mut builder = Response::builder()
        .status(response.status())
        .version(response.version());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(response.headers().clone());
    }
    builder
        .body(response.body().clone())
        .expect("rebuilding a response from valid parts cannot fail")
}
