//! Boundary to the embedded request-processing engine

use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// Errors raised by an engine, opaque to the adapters
///
/// `Display` is the bare message so adapters can surface it unchanged in error results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine failed to execute the request
    #[error("{0}")]
    Execution(String),

    /// The per-request context could not be produced
    #[error("{0}")]
    Context(String),

    /// A chunk of an incremental body failed
    #[error("{0}")]
    Stream(String),
}

impl EngineError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    pub fn context(message: impl Into<String>) -> Self {
        Self::Context(message.into())
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }
}

/// Lazily evaluated per-request context
///
/// The engine decides whether and when to resolve it; resolving consumes the producer,
/// so the user context function runs at most once per request.
pub struct ContextProducer<'a, T> {
    produce: Box<dyn FnOnce() -> BoxFuture<'a, Result<T, EngineError>> + Send + 'a>,
}

impl<'a, T: 'a> ContextProducer<'a, T> {
    /// Wrap a deferred context computation
    pub fn new<F, Fut>(produce: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, EngineError>> + Send + 'a,
    {
        Self {
            produce: Box::new(move || -> BoxFuture<'a, Result<T, EngineError>> {
                Box::pin(produce())
            }),
        }
    }

    /// Producer for a context value that already exists
    pub fn ready(value: T) -> Self
    where
        T: Send,
    {
        Self::new(move || async move { Ok(value) })
    }

    /// Run the context computation
    pub async fn resolve(self) -> Result<T, EngineError> {
        (self.produce)().await
    }
}

/// Embedded request-processing engine
///
/// One engine instance is shared read-only across every invocation for the lifetime of
/// the process, so implementations must tolerate concurrent `execute` calls.
#[async_trait]
pub trait HttpEngine: Send + Sync {
    /// Per-request context built by the adapter's context function
    type Context: Send + 'static;

    /// Begin engine startup
    ///
    /// Called exactly once by the adapter builder before any invocation handler is
    /// handed out. Startup failures are the engine's to report, typically by failing
    /// every subsequent `execute` call.
    fn start_in_background(&self);

    /// Execute one request
    ///
    /// Cancellation and timeouts are the engine's concern; whatever it raises is
    /// propagated to the adapter unchanged.
    async fn execute(
        &self,
        request: HttpRequest,
        context: ContextProducer<'_, Self::Context>,
    ) -> Result<HttpResponse, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_context_is_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let producer = ContextProducer::new(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, EngineError>("ctx")
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(producer.resolve().await.unwrap(), "ctx");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ready_context() {
        let producer = ContextProducer::ready(42u32);
        assert_eq!(producer.resolve().await, Ok(42));
    }

    #[test]
    fn test_error_display_is_bare_message() {
        assert_eq!(EngineError::execution("boom").to_string(), "boom");
        assert_eq!(EngineError::context("no user").to_string(), "no user");
    }
}
