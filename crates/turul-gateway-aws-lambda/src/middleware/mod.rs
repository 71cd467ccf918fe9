//! Middleware pipeline for Lambda invocations
//!
//! Middleware runs against the raw trigger event before it is parsed, and each step
//! decides how the invocation proceeds:
//!
//! - [`MiddlewareAction::Continue`] - run the next middleware
//! - [`MiddlewareAction::Respond`] - short-circuit with a finished result; the engine
//!   and every result middleware are skipped
//! - [`MiddlewareAction::OnResult`] - register a [`ResultMiddleware`] that runs after
//!   the engine, in registration order, against the final (success or error) result
//!
//! An `Err(MiddlewareError)` aborts the pipeline. The error is converted into the
//! trigger's error result and passed through the result middleware registered so far.
//!
//! # Examples
//!
//! ```rust
//! use turul_gateway_aws_lambda::middleware::{from_fn, MiddlewareAction};
//! use turul_gateway_aws_lambda::triggers::api_gateway_v2::{ApiGatewayV2Event, ApiGatewayV2Result};
//!
//! let add_cookie = from_fn(|_event: &mut ApiGatewayV2Event| {
//!     Box::pin(async move {
//!         Ok(MiddlewareAction::on_result(|result: &mut ApiGatewayV2Result| {
//!             Box::pin(async move {
//!                 result.cookies.get_or_insert_with(Vec::new).push("seen=1".to_string());
//!             })
//!         }))
//!     })
//! });
//! # let _ = add_cookie;
//! ```

pub mod error;
pub mod stack;
pub mod traits;

pub use error::MiddlewareError;
pub use stack::{DeferredMiddleware, MiddlewareStack, PipelineOutcome};
pub use traits::{FnMiddleware, LambdaMiddleware, MiddlewareAction, ResultMiddleware, from_fn};
