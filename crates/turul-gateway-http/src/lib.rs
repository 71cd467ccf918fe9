//! Canonical HTTP model for turul gateway adapters
//!
//! Trigger-specific adapters (API Gateway, load balancers) normalise their events into
//! the types in this crate before handing them to an embedded request-processing engine,
//! and convert the engine's [`HttpResponse`] back into whatever result shape their
//! trigger expects.
//!
//! ## Architecture
//!
//! - **Request model**: [`HttpRequest`] with an ordered [`HeaderMap`], raw query string
//!   and a [`RequestBody`] that is empty, text, or parsed JSON
//! - **Response model**: [`HttpResponse`] whose [`ResponseBody`] is either complete or a
//!   stream of chunks, plus [`HttpMetadata`] for streaming triggers
//! - **Engine boundary**: the [`HttpEngine`] trait and its lazily resolved
//!   [`ContextProducer`]
//!
//! ## Quick Start
//!
//! ```rust
//! use async_trait::async_trait;
//! use turul_gateway_http::{
//!     ContextProducer, EngineError, HttpEngine, HttpRequest, HttpResponse,
//! };
//!
//! struct HelloEngine;
//!
//! #[async_trait]
//! impl HttpEngine for HelloEngine {
//!     type Context = ();
//!
//!     fn start_in_background(&self) {}
//!
//!     async fn execute(
//!         &self,
//!         request: HttpRequest,
//!         _context: ContextProducer<'_, ()>,
//!     ) -> Result<HttpResponse, EngineError> {
//!         Ok(HttpResponse::complete(200, format!("hello from {}", request.method)))
//!     }
//! }
//! ```

pub mod engine;
pub mod headers;
pub mod request;
pub mod response;

/// Engine trait, lazy context producer and engine errors
pub use engine::{ContextProducer, EngineError, HttpEngine};
/// Ordered, case-preserving header multimap
pub use headers::HeaderMap;
/// Canonical request record
pub use request::{HttpRequest, RequestBody};
/// Canonical response records for buffered and streaming delivery
pub use response::{ChunkStream, HttpMetadata, HttpResponse, ResponseBody};
