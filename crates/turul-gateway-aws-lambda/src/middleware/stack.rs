//! Middleware stack execution

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::{LambdaMiddleware, MiddlewareAction, MiddlewareError, ResultMiddleware};
use crate::error::LambdaError;

/// Result middleware collected during the request phase, in registration order
pub struct DeferredMiddleware<R> {
    callbacks: Vec<ResultMiddleware<R>>,
}

impl<R> DeferredMiddleware<R> {
    fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every callback once, in registration order, against `result`
    pub async fn apply(self, result: &mut R) {
        for callback in self.callbacks {
            callback.apply(result).await;
        }
    }
}

impl<R> Default for DeferredMiddleware<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for DeferredMiddleware<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredMiddleware")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Terminal state of the request phase
#[derive(Debug)]
pub enum PipelineOutcome<R> {
    /// A middleware returned a result; engine and result middleware are skipped
    ShortCircuited(R),
    /// A middleware failed; holds the error result after the result middleware
    /// registered before the failure have run against it
    Failed(R),
    /// Every middleware continued; the engine should run and the deferred
    /// middleware be applied to its result
    Continued(DeferredMiddleware<R>),
}

/// Ordered collection of middleware with execution logic
///
/// Request-phase middleware executes strictly in registration order. Result
/// middleware (registered through [`MiddlewareAction::OnResult`]) is returned in
/// [`PipelineOutcome::Continued`] and executes in registration order too, once the
/// caller has a final result.
///
/// # Examples
///
/// ```rust
/// use turul_gateway_aws_lambda::middleware::{from_fn, MiddlewareAction, MiddlewareStack};
///
/// let mut stack: MiddlewareStack<Vec<String>, String> = MiddlewareStack::new();
/// stack.push_fn(|event: &mut Vec<String>| {
///     Box::pin(async move {
///         event.push("seen".to_string());
///         Ok(MiddlewareAction::Continue)
///     })
/// });
///
/// assert_eq!(stack.len(), 1);
/// ```
pub struct MiddlewareStack<E, R> {
    middleware: Vec<Arc<dyn LambdaMiddleware<E, R>>>,
}

impl<E, R> Default for MiddlewareStack<E, R> {
    fn default() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }
}

impl<E, R> Clone for MiddlewareStack<E, R> {
    fn clone(&self) -> Self {
        Self {
            middleware: self.middleware.clone(),
        }
    }
}

impl<E, R> MiddlewareStack<E, R>
where
    E: Send,
    R: Send,
{
    /// Create an empty middleware stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Add middleware to the end of the stack
    pub fn push(&mut self, middleware: Arc<dyn LambdaMiddleware<E, R>>) {
        self.middleware.push(middleware);
    }

    /// Add closure middleware to the end of the stack
    pub fn push_fn<F>(&mut self, f: F)
    where
        E: 'static,
        R: 'static,
        F: for<'a> Fn(&'a mut E) -> BoxFuture<'a, Result<MiddlewareAction<R>, MiddlewareError>>
            + Send
            + Sync
            + 'static,
    {
        self.push(Arc::new(super::from_fn(f)));
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Run the request phase against `event`
    ///
    /// `to_error_result` converts a middleware failure into the trigger's error
    /// result; it is only called when a middleware fails.
    pub async fn execute<F>(&self, event: &mut E, to_error_result: F) -> PipelineOutcome<R>
    where
        F: FnOnce(&LambdaError) -> R,
    {
        let mut deferred = DeferredMiddleware::new();

        for (index, middleware) in self.middleware.iter().enumerate() {
            match middleware.on_request(event).await {
                Ok(MiddlewareAction::Continue) => {}
                Ok(MiddlewareAction::OnResult(callback)) => {
                    deferred.callbacks.push(callback);
                }
                Ok(MiddlewareAction::Respond(result)) => {
                    debug!("Middleware #{} short-circuited the invocation", index);
                    return PipelineOutcome::ShortCircuited(result);
                }
                Err(err) => {
                    warn!("Middleware #{} failed: {}", index, err);
                    let mut result = to_error_result(&LambdaError::Middleware(err));
                    deferred.apply(&mut result).await;
                    return PipelineOutcome::Failed(result);
                }
            }
        }

        debug!(
            "Middleware pipeline continued with {} result middleware",
            deferred.len()
        );
        PipelineOutcome::Continued(deferred)
    }
}
