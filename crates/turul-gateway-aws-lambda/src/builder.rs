//! Fluent builder for Lambda engine handlers
//!
//! The builder is the only way to obtain a [`LambdaEngineHandler`], and it starts the
//! engine exactly once while building, so no invocation can reach an engine that was
//! never started.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};
use turul_gateway_http::{EngineError, HttpEngine};

use crate::handler::{ContextFunction, ContextFunctionArgument, LambdaEngineHandler};
use crate::middleware::{LambdaMiddleware, MiddlewareAction, MiddlewareError, MiddlewareStack};
use crate::request_handler::TriggerHandler;

/// Builder for [`LambdaEngineHandler`]
///
/// ## Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use turul_gateway_aws_lambda::prelude::*;
///
/// struct Engine;
///
/// #[async_trait]
/// impl HttpEngine for Engine {
///     type Context = ();
///
///     fn start_in_background(&self) {}
///
///     async fn execute(
///         &self,
///         request: HttpRequest,
///         _context: ContextProducer<'_, ()>,
///     ) -> Result<HttpResponse, EngineError> {
///         Ok(HttpResponse::complete(200, request.search))
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), lambda_runtime::Error> {
///     let handler = LambdaEngineHandlerBuilder::new(Engine, api_gateway_v2_request_handler())
///         .middleware_fn(|event: &mut ApiGatewayV2Event| {
///             Box::pin(async move {
///                 event.headers.insert("x-trigger".to_string(), "v2".to_string());
///                 Ok(MiddlewareAction::Continue)
///             })
///         })
///         .default_context()
///         .build();
///
///     lambda_runtime::run(lambda_runtime::service_fn(
///         move |event: lambda_runtime::LambdaEvent<ApiGatewayV2Event>| {
///             let handler = handler.clone();
///             async move {
///                 Ok::<_, lambda_runtime::Error>(handler.handle(event.payload, event.context).await)
///             }
///         },
///     ))
///     .await
/// }
/// ```
pub struct LambdaEngineHandlerBuilder<G, H, C>
where
    G: HttpEngine,
    H: TriggerHandler,
{
    engine: Arc<G>,
    handler: Arc<H>,
    middleware: MiddlewareStack<H::Event, H::Output>,
    context: Option<ContextFunction<H::Event, C, G::Context>>,
}

impl<G, H, C> LambdaEngineHandlerBuilder<G, H, C>
where
    G: HttpEngine,
    H: TriggerHandler,
    C: Send + Sync + 'static,
{
    /// Start building a handler for `engine` and the trigger `handler`
    pub fn new(engine: G, handler: H) -> Self {
        Self::with_shared_engine(Arc::new(engine), handler)
    }

    /// Like [`new`](Self::new) for an engine that is already shared
    pub fn with_shared_engine(engine: Arc<G>, handler: H) -> Self {
        Self {
            engine,
            handler: Arc::new(handler),
            middleware: MiddlewareStack::new(),
            context: None,
        }
    }

    /// Append middleware; middleware runs in the order it was added
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: LambdaMiddleware<H::Event, H::Output> + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append closure middleware
    pub fn middleware_fn<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(
                &'a mut H::Event,
            ) -> BoxFuture<'a, Result<MiddlewareAction<H::Output>, MiddlewareError>>
            + Send
            + Sync
            + 'static,
    {
        self.middleware.push_fn(f);
        self
    }

    /// Set the function that builds the engine's per-request context
    ///
    /// It receives the event after request-phase middleware has run, and only runs if
    /// the engine resolves its context.
    pub fn context<F>(mut self, context: F) -> Self
    where
        F: for<'a> Fn(
                ContextFunctionArgument<'a, H::Event, C>,
            ) -> BoxFuture<'a, Result<G::Context, EngineError>>
            + Send
            + Sync
            + 'static,
    {
        self.context = Some(Arc::new(context));
        self
    }

    /// Use `G::Context::default()` as the per-request context
    pub fn default_context(self) -> Self
    where
        G::Context: Default,
    {
        self.context(|_| Box::pin(async { Ok(<G::Context as Default>::default()) }))
    }

    /// Start the engine and return the invocation handler
    pub fn build(self) -> LambdaEngineHandler<G, H, C> {
        debug!(
            "Building {} handler with {} middleware",
            H::KIND,
            self.middleware.len()
        );
        self.engine.start_in_background();
        info!("Engine started");

        LambdaEngineHandler::new(self.engine, self.handler, self.middleware, self.context)
    }
}
