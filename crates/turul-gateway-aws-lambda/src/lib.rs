//! AWS Lambda integration for turul gateway engines
//!
//! This crate adapts Lambda trigger events (API Gateway REST and HTTP APIs, function
//! URLs, Application Load Balancers) into the canonical request model of
//! [`turul_gateway_http`], runs them through an embedded [`HttpEngine`], and converts the
//! engine's response back into the trigger's result shape.
//!
//! ## Architecture
//!
//! - **Trigger adapters** ([`triggers`]): event and result shapes plus ready-made
//!   [`RequestHandler`]s, including an auto-detecting handler
//! - **Request handlers** ([`request_handler`]): parser and result conversions per
//!   trigger, buffered ([`RequestHandler`]) or streaming ([`StreamRequestHandler`])
//! - **Middleware** ([`middleware`]): request-phase interceptors that can continue,
//!   short-circuit, or register callbacks on the final result
//! - **Orchestration** ([`handler`]): the invocation algorithm for both paths
//! - **Streaming** ([`streaming`]): the once-only metadata sink and a channel-backed
//!   implementation producing Lambda's response-streaming wire format
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use lambda_runtime::{Error, LambdaEvent, service_fn};
//! use serde_json::Value;
//! use turul_gateway_aws_lambda::prelude::*;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl HttpEngine for Echo {
//!     type Context = ();
//!
//!     fn start_in_background(&self) {}
//!
//!     async fn execute(
//!         &self,
//!         request: HttpRequest,
//!         _context: ContextProducer<'_, ()>,
//!     ) -> std::result::Result<HttpResponse, EngineError> {
//!         Ok(HttpResponse::complete(200, request.method))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Error> {
//!     let handler = LambdaEngineHandlerBuilder::new(Echo, any_event_request_handler())
//!         .default_context()
//!         .build();
//!
//!     lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
//!         let handler = handler.clone();
//!         async move { Ok::<_, Error>(handler.handle(event.payload, event.context).await) }
//!     }))
//!     .await
//! }
//! ```

pub mod adapter;
pub mod builder;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod prelude;
pub mod request_handler;
pub mod streaming;
pub mod triggers;

// Re-exports for convenience
/// Builder that starts the engine and produces invocation handlers
pub use builder::LambdaEngineHandlerBuilder;
/// Lambda-specific error types and result aliases
pub use error::{LambdaError, Result};
/// Invocation orchestrator and context function types
pub use handler::{ContextFunction, ContextFunctionArgument, LambdaEngineHandler};
/// Trigger handler abstraction
pub use request_handler::{
    EventParser, HandlerKind, ParserParts, RequestHandler, ResultGenerator, StreamRequestHandler,
    StreamResult, TriggerHandler,
};
/// Response streaming sink
pub use streaming::{ChannelResponseStream, ResponseStream, ResponseWriter, StreamError};
/// Supported trigger formats
pub use triggers::TriggerKind;

pub use turul_gateway_http::HttpEngine;
