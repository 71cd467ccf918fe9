//! Invocation orchestration
//!
//! [`LambdaEngineHandler`] ties a trigger handler, the middleware stack and a shared
//! engine together. Which entry point it exposes depends on the trigger handler:
//! [`handle`](LambdaEngineHandler::handle) for [`RequestHandler`]s and
//! [`handle_streaming`](LambdaEngineHandler::handle_streaming) for
//! [`StreamRequestHandler`]s.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::future::BoxFuture;
use tracing::{debug, error, info, warn};
use turul_gateway_http::{
    ContextProducer, EngineError, HttpEngine, HttpMetadata, HttpResponse, ResponseBody,
};

use crate::error::{LambdaError, Result};
use crate::middleware::{MiddlewareStack, PipelineOutcome};
use crate::request_handler::{
    HandlerKind, RequestHandler, StreamRequestHandler, StreamResult, TriggerHandler,
};
use crate::streaming::{ResponseStream, ResponseWriter};

/// What a context function sees: the (middleware-processed) event and the host context
pub struct ContextFunctionArgument<'a, E, C> {
    pub event: &'a E,
    pub context: &'a C,
}

/// Builds the engine's per-request context; only runs if the engine asks for it
pub type ContextFunction<E, C, T> = Arc<
    dyn for<'a> Fn(
            ContextFunctionArgument<'a, E, C>,
        ) -> BoxFuture<'a, std::result::Result<T, EngineError>>
        + Send
        + Sync,
>;

/// Invocation handler for one trigger and one engine
///
/// `C` is the host invocation context (`lambda_runtime::Context` in a deployed
/// function). Cloning is cheap: engine, trigger handler and middleware are shared.
pub struct LambdaEngineHandler<G, H, C>
where
    G: HttpEngine,
    H: TriggerHandler,
{
    engine: Arc<G>,
    handler: Arc<H>,
    middleware: MiddlewareStack<H::Event, H::Output>,
    context: Option<ContextFunction<H::Event, C, G::Context>>,
}

impl<G, H, C> Clone for LambdaEngineHandler<G, H, C>
where
    G: HttpEngine,
    H: TriggerHandler,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            handler: Arc::clone(&self.handler),
            middleware: self.middleware.clone(),
            context: self.context.clone(),
        }
    }
}

impl<G, H, C> LambdaEngineHandler<G, H, C>
where
    G: HttpEngine,
    H: TriggerHandler,
    C: Sync,
{
    /// Assemble a handler; the engine must already be started
    ///
    /// Use [`LambdaEngineHandlerBuilder`](crate::LambdaEngineHandlerBuilder), which
    /// starts the engine exactly once.
    pub(crate) fn new(
        engine: Arc<G>,
        handler: Arc<H>,
        middleware: MiddlewareStack<H::Event, H::Output>,
        context: Option<ContextFunction<H::Event, C, G::Context>>,
    ) -> Self {
        Self {
            engine,
            handler,
            middleware,
            context,
        }
    }

    /// Orchestration path this handler drives
    pub fn kind(&self) -> HandlerKind {
        H::KIND
    }

    pub fn engine(&self) -> &Arc<G> {
        &self.engine
    }

    /// Request phase: run middleware, converting a failure into an error result
    async fn run_middleware(&self, event: &mut H::Event) -> PipelineOutcome<H::Output> {
        self.middleware
            .execute(event, |err| self.handler.to_error_result(err))
            .await
    }

    /// Parse the event and run the engine
    async fn execute_engine(&self, event: &H::Event, context: &C) -> Result<HttpResponse> {
        let request = self.handler.from_event(event)?;
        debug!(
            "Executing engine: {} (search: '{}', {} headers)",
            request.method,
            request.search,
            request.headers.len()
        );

        let response = self
            .engine
            .execute(request, self.context_producer(event, context))
            .await?;
        debug!(
            "Engine responded with status {} ({} body)",
            response.status_or_default(),
            response.body.kind()
        );
        Ok(response)
    }

    fn context_producer<'a>(
        &'a self,
        event: &'a H::Event,
        context: &'a C,
    ) -> ContextProducer<'a, G::Context> {
        match &self.context {
            Some(context_fn) => {
                ContextProducer::new(move || context_fn(ContextFunctionArgument { event, context }))
            }
            None => ContextProducer::new(|| async {
                Err(EngineError::context("no context function configured"))
            }),
        }
    }
}

impl<G, E, R, C> LambdaEngineHandler<G, RequestHandler<E, R>, C>
where
    G: HttpEngine,
    E: Send + Sync + 'static,
    R: Send + 'static,
    C: Sync,
{
    /// Handle one buffered invocation
    ///
    /// Never fails: parse, engine and conversion errors all become the trigger's error
    /// result. Result middleware registered during the request phase runs against
    /// whichever result is returned, except after a short-circuit.
    pub async fn handle(&self, mut event: E, context: C) -> R {
        debug!("Handling {} invocation", self.kind());

        let deferred = match self.run_middleware(&mut event).await {
            PipelineOutcome::ShortCircuited(result) | PipelineOutcome::Failed(result) => {
                return result;
            }
            PipelineOutcome::Continued(deferred) => deferred,
        };

        let outcome = self
            .execute_engine(&event, &context)
            .await
            .and_then(|response| self.handler.to_success_result(&event, response));

        let mut result = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!("Invocation failed: {}", err);
                self.handler.to_error_result(&err)
            }
        };

        deferred.apply(&mut result).await;
        result
    }
}

impl<G, E, C> LambdaEngineHandler<G, StreamRequestHandler<E>, C>
where
    G: HttpEngine,
    E: Send + Sync + 'static,
    C: Sync,
{
    /// Handle one streaming invocation, writing the response to `response_stream`
    ///
    /// Metadata is attached exactly once. Errors raised before that point produce a
    /// complete error response; an error from a chunked body after metadata has been
    /// sent is written as one more chunk carrying the error body before the stream is
    /// closed.
    ///
    /// Result middleware runs against a [`StreamResult`] before metadata is attached.
    /// For chunked bodies its `body` starts empty; anything a middleware puts there is
    /// written ahead of the engine's chunks.
    ///
    /// Only failures of the output sink itself are returned as errors.
    pub async fn handle_streaming<S>(
        &self,
        mut event: E,
        response_stream: S,
        context: C,
    ) -> Result<()>
    where
        S: ResponseStream,
    {
        debug!("Handling {} invocation", self.kind());

        let deferred = match self.run_middleware(&mut event).await {
            PipelineOutcome::ShortCircuited(result) | PipelineOutcome::Failed(result) => {
                return write_complete(response_stream, result).await;
            }
            PipelineOutcome::Continued(deferred) => deferred,
        };

        let (metadata, body) = match self.prepare_stream(&event, &context).await {
            Ok(parts) => parts,
            Err(err) => {
                warn!("Invocation failed before metadata was sent: {}", err);
                let mut result = self.handler.to_error_result(&err);
                deferred.apply(&mut result).await;
                return write_complete(response_stream, result).await;
            }
        };

        let mut chunks = match body {
            ResponseBody::Complete(body) => {
                let mut result = StreamResult { metadata, body };
                deferred.apply(&mut result).await;
                return write_complete(response_stream, result).await;
            }
            ResponseBody::Chunked(chunks) => chunks,
        };

        let mut result = StreamResult {
            metadata,
            body: String::new(),
        };
        deferred.apply(&mut result).await;

        let mut writer = response_stream.attach(result.metadata).await?;
        if !result.body.is_empty() {
            writer.write(Bytes::from(result.body)).await?;
        }

        let mut written = 0usize;
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => {
                    writer.write(Bytes::from(chunk)).await?;
                    written += 1;
                }
                Err(err) => {
                    error!("Chunked body failed after {} chunks: {}", written, err);
                    let error_result = self.handler.to_error_result(&LambdaError::Engine(err));
                    writer.write(Bytes::from(error_result.body)).await?;
                    break;
                }
            }
        }

        info!("Streamed {} chunks", written);
        writer.close().await?;
        Ok(())
    }

    async fn prepare_stream(&self, event: &E, context: &C) -> Result<(HttpMetadata, ResponseBody)> {
        let response = self.execute_engine(event, context).await?;
        let metadata = self.handler.build_http_metadata(&response).await?;
        Ok((metadata, response.body))
    }
}

/// Attach metadata, write one complete body and close
async fn write_complete<S: ResponseStream>(response_stream: S, result: StreamResult) -> Result<()> {
    let mut writer = response_stream.attach(result.metadata).await?;
    writer.write(Bytes::from(result.body)).await?;
    writer.close().await?;
    Ok(())
}
