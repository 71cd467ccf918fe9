//! Core middleware trait definitions

use std::fmt;

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::MiddlewareError;

/// Deferred callback run against the final result of an invocation
///
/// Registered during the request phase via [`MiddlewareAction::OnResult`]. It receives a
/// mutable handle to the result, so changes are visible to later result middleware and
/// to the value finally returned to the Lambda runtime.
pub struct ResultMiddleware<R> {
    apply: Box<dyn for<'a> FnOnce(&'a mut R) -> BoxFuture<'a, ()> + Send>,
}

impl<R> ResultMiddleware<R> {
    pub fn new<F>(apply: F) -> Self
    where
        F: for<'a> FnOnce(&'a mut R) -> BoxFuture<'a, ()> + Send + 'static,
    {
        Self {
            apply: Box::new(apply),
        }
    }

    /// Run the callback; consuming `self` guarantees it runs at most once
    pub async fn apply(self, result: &mut R) {
        (self.apply)(result).await
    }
}

impl<R> fmt::Debug for ResultMiddleware<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResultMiddleware(..)")
    }
}

/// What a middleware step asks the pipeline to do next
#[derive(Debug)]
pub enum MiddlewareAction<R> {
    /// Continue with the next middleware
    Continue,
    /// Stop here and return this result without invoking the engine
    Respond(R),
    /// Continue, and run this callback against the final result
    OnResult(ResultMiddleware<R>),
}

impl<R> MiddlewareAction<R> {
    /// Register a result callback
    pub fn on_result<F>(apply: F) -> Self
    where
        F: for<'a> FnOnce(&'a mut R) -> BoxFuture<'a, ()> + Send + 'static,
    {
        Self::OnResult(ResultMiddleware::new(apply))
    }
}

/// Request-phase interceptor for a trigger event type `E` and result type `R`
///
/// # Lifecycle
///
/// 1. **Request phase**: `on_request` runs in registration order against the raw event,
///    before it is parsed. Mutations to the event are visible to the request the
///    engine receives.
/// 2. **Result phase**: callbacks returned as [`MiddlewareAction::OnResult`] run after
///    the engine, in registration order, whether the invocation succeeded or failed.
///
/// Implementations are shared across concurrent invocations; per-invocation state
/// belongs in the event or in the returned callback.
///
/// # Examples
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use turul_gateway_aws_lambda::middleware::{LambdaMiddleware, MiddlewareAction, MiddlewareError};
/// use turul_gateway_aws_lambda::triggers::api_gateway_v2::{ApiGatewayV2Event, ApiGatewayV2Result};
///
/// struct ApiKeyAuth {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl LambdaMiddleware<ApiGatewayV2Event, ApiGatewayV2Result> for ApiKeyAuth {
///     async fn on_request(
///         &self,
///         event: &mut ApiGatewayV2Event,
///     ) -> Result<MiddlewareAction<ApiGatewayV2Result>, MiddlewareError> {
///         match event.headers.get("x-api-key") {
///             Some(key) if *key == self.api_key => Ok(MiddlewareAction::Continue),
///             Some(_) => Err(MiddlewareError::unauthorized("Invalid API key")),
///             None => Ok(MiddlewareAction::Respond(ApiGatewayV2Result {
///                 status_code: 401,
///                 ..Default::default()
///             })),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait LambdaMiddleware<E, R>: Send + Sync {
    async fn on_request(&self, event: &mut E) -> Result<MiddlewareAction<R>, MiddlewareError>;
}

/// Middleware backed by a closure, see [`from_fn`]
pub struct FnMiddleware<F> {
    f: F,
}

/// Build middleware from a closure returning a boxed future
///
/// ```rust
/// use turul_gateway_aws_lambda::middleware::{from_fn, MiddlewareAction};
/// use turul_gateway_aws_lambda::triggers::api_gateway_v2::{ApiGatewayV2Event, ApiGatewayV2Result};
///
/// let tag_requests = from_fn(|event: &mut ApiGatewayV2Event| {
///     Box::pin(async move {
///         event.headers.insert("x-gateway".to_string(), "lambda".to_string());
///         Ok(MiddlewareAction::<ApiGatewayV2Result>::Continue)
///     })
/// });
/// # let _ = tag_requests;
/// ```
pub fn from_fn<E, R, F>(f: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut E) -> BoxFuture<'a, Result<MiddlewareAction<R>, MiddlewareError>>
        + Send
        + Sync,
{
    FnMiddleware { f }
}

#[async_trait]
impl<E, R, F> LambdaMiddleware<E, R> for FnMiddleware<F>
where
    E: Send + 'static,
    R: Send + 'static,
    F: for<'a> Fn(&'a mut E) -> BoxFuture<'a, Result<MiddlewareAction<R>, MiddlewareError>>
        + Send
        + Sync,
{
    async fn on_request(&self, event: &mut E) -> Result<MiddlewareAction<R>, MiddlewareError> {
        (self.f)(event).await
    }
}
