//! # AWS Lambda Gateway Prelude
//!
//! Commonly used types for wiring an engine to Lambda triggers.
//!
//! ```rust
//! use turul_gateway_aws_lambda::prelude::*;
//! ```

// Core Lambda types
pub use crate::builder::LambdaEngineHandlerBuilder;
pub use crate::error::LambdaError;
pub use crate::handler::{ContextFunctionArgument, LambdaEngineHandler};
pub use crate::middleware::{LambdaMiddleware, MiddlewareAction, MiddlewareError, from_fn};
pub use crate::request_handler::{RequestHandler, StreamRequestHandler, StreamResult};
pub use crate::streaming::{ChannelResponseStream, ResponseStream, ResponseWriter};

// Trigger adapters
pub use crate::triggers::alb::{AlbEvent, AlbResult, alb_request_handler};
pub use crate::triggers::api_gateway_v1::{
    ApiGatewayV1Event, ApiGatewayV1Result, api_gateway_v1_request_handler,
};
pub use crate::triggers::api_gateway_v2::{
    ApiGatewayV2Event, ApiGatewayV2Result, api_gateway_v2_request_handler,
    api_gateway_v2_stream_request_handler,
};
pub use crate::triggers::auto::{AnyEventResult, any_event_request_handler};

// Canonical model and engine boundary
pub use turul_gateway_http::{
    ContextProducer, EngineError, HeaderMap, HttpEngine, HttpMetadata, HttpRequest,
    HttpResponse, RequestBody, ResponseBody,
};
