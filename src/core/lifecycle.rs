//! One-time process lifecycle events.
//!
//! Install and activate map onto an explicit `Pending -> Fired` state
//! machine: handlers register while pending, the first fire runs them all and
//! transitions the state, and any further fire is a no-op. A failing handler
//! is reported and never blocks its siblings.
use std::{
    future::Future,
    sync::{Arc, Mutex},
};

use eyre::Result;
use futures_util::future::{BoxFuture, join_all};
use thiserror::Error;

/// A registered lifecycle handler.
pub type LifecycleHandler = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Lifecycle misuse errors, raised at configuration time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LifecycleError {
    /// Registration attempted after the event fired.
    #[error("the '{0}' event already fired; handlers can no longer be registered")]
    AlreadyFired(&'static str),
}

enum TokenState {
    Pending(Vec<LifecycleHandler>),
    Fired,
}

/// Registration half of a one-time event.
#[derive(Clone)]
pub struct EventToken {
    name: &'static str,
    state: Arc<Mutex<TokenState>>,
}

impl EventToken {
    /// Register a handler to run when the event fires.
    pub fn register<F, Fut>(&self, handler: F) -> Result<(), LifecycleError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let mut state = self.state.lock().expect("event token lock poisoned");
        match &mut *state {
            TokenState::Pending(handlers) => {
                handlers.push(Arc::new(move || Box::pin(handler())));
                Ok(())
            }
            TokenState::Fired => Err(LifecycleError::AlreadyFired(self.name)),
        }
    }

    pub fn has_fired(&self) -> bool {
        matches!(
            *self.state.lock().expect("event token lock poisoned"),
            TokenState::Fired
        )
    }
}

/// Firing half of a one-time event.
pub struct EventTokenSource {
    name: &'static str,
    state: Arc<Mutex<TokenState>>,
}

impl EventTokenSource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(TokenState::Pending(Vec::new()))),
        }
    }

    /// Handle for registering handlers against this event.
    pub fn token(&self) -> EventToken {
        EventToken {
            name: self.name,
            state: Arc::clone(&self.state),
        }
    }

    /// Run all registered handlers, once.
    ///
    /// Handlers run concurrently and are awaited together; a failure is
    /// logged per handler without affecting the others. Any call after the
    /// first is a no-op.
    pub async fn fire(&self) {
        let handlers = {
            let mut state = self.state.lock().expect("event token lock poisoned");
            match std::mem::replace(&mut *state, TokenState::Fired) {
                TokenState::Pending(handlers) => handlers,
                TokenState::Fired => return,
            }
        };

        let results = join_all(handlers.iter().map(|handler| handler())).await;
        for (index, result) in results.into_iter().enumerate() {
            if let Err(error) = result {
                tracing::error!(
                    event = self.name,
                    handler = index,
                    error = %error,
                    "lifecycle handler failed"
                );
            }
        }
    }
}

/// The two one-time events of a worker process.
pub struct ApplicationLifetime {
    install_source: EventTokenSource,
    activate_source: EventTokenSource,
    /// Fires once when the worker is installed.
    pub installing: EventToken,
    /// Fires once when the worker is activated.
    pub activating: EventToken,
}

impl ApplicationLifetime {
    pub fn new() -> Self {
        let install_source = EventTokenSource::new("install");
        let activate_source = EventTokenSource::new("activate");
        let installing = install_source.token();
        let activating = activate_source.token();
        Self {
            install_source,
            activate_source,
            installing,
            activating,
        }
    }

    pub(crate) fn install_source(&self) -> &EventTokenSource {
        &self.install_source
    }

    pub(crate) fn activate_source(&self) -> &EventTokenSource {
        &self.activate_source
    }
}

impl Default for ApplicationLifetime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_fire_runs_handlers_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = EventTokenSource::new("install");

        let counted = Arc::clone(&calls);
        source
            .token()
            .register(move || {
                let counted = Arc::clone(&counted);
                async move {
                    counted.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                }
            })
            .unwrap();

        source.fire().await;
        source.fire().await;
        source.fire().await;

        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_block_siblings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = EventTokenSource::new("activate");
        let token = source.token();

        token
            .register(|| async { Err(eyre::eyre!("handler exploded")) })
            .unwrap();

        let counted = Arc::clone(&calls);
        token
            .register(move || {
                let counted = Arc::clone(&counted);
                async move {
                    counted.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                }
            })
            .unwrap();

        source.fire().await;
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_registration_after_fire_is_rejected() {
        let source = EventTokenSource::new("install");
        let token = source.token();
        source.fire().await;

        assert!(token.has_fired());
        assert_eq!(
            token.register(|| async { Ok(()) }).unwrap_err(),
            LifecycleError::AlreadyFired("install")
        );
    }
}
