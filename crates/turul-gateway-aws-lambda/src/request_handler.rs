//! Trigger-specific request handlers
//!
//! A handler pairs an [`EventParser`] (event → [`HttpRequest`]) with the conversions
//! back to the trigger's result shape. Handlers are built once at startup and shared
//! by every invocation; they hold plain function pointers and no per-call state.
//!
//! Two capability variants exist, selected by [`TriggerHandler::KIND`]:
//!
//! - [`RequestHandler`] ([`HandlerKind::Buffered`]): one result value per invocation
//! - [`StreamRequestHandler`] ([`HandlerKind::Streaming`]): metadata first, then body
//!   chunks written to a response stream

use std::fmt;

use turul_gateway_http::{HeaderMap, HttpMetadata, HttpRequest, HttpResponse, RequestBody};

use crate::adapter;
use crate::error::{LambdaError, Result};

/// Invocation style a handler drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Return one complete result
    Buffered,
    /// Write metadata and body chunks to a response stream
    Streaming,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered => f.write_str("buffered"),
            Self::Streaming => f.write_str("streaming"),
        }
    }
}

/// Field-by-field event parser
///
/// `headers` runs first so `body` can read the resolved `content-type`.
pub struct ParserParts<E> {
    pub method: fn(&E) -> String,
    pub headers: fn(&E) -> HeaderMap,
    pub query: fn(&E) -> String,
    pub body: fn(&E, &HeaderMap) -> Result<RequestBody>,
}

/// Event → canonical request conversion
///
/// Both compositions sit behind [`EventParser::parse`]. Parsing must fail on malformed
/// bodies rather than substituting a default.
pub enum EventParser<E> {
    /// One function performing the whole mapping
    Whole(fn(&E) -> Result<HttpRequest>),
    /// Four orthogonal field parsers composed by [`EventParser::parse`]
    Parts(ParserParts<E>),
}

impl<E> EventParser<E> {
    pub fn parse(&self, event: &E) -> Result<HttpRequest> {
        match self {
            Self::Whole(parse) => parse(event),
            Self::Parts(parts) => {
                let headers = (parts.headers)(event);
                let body = (parts.body)(event, &headers)?;
                Ok(HttpRequest {
                    method: (parts.method)(event),
                    search: (parts.query)(event),
                    headers,
                    body,
                })
            }
        }
    }
}

/// Engine response (or error) → trigger result conversion
///
/// `success` also receives the event the request was parsed from, for triggers whose
/// result framing depends on how the event arrived (load balancer multi-value mode,
/// auto-detected triggers).
pub struct ResultGenerator<E, R> {
    /// Must reject chunked bodies with [`LambdaError::UnsupportedResponseKind`] when
    /// the trigger has no framing for them
    pub success: fn(&E, HttpResponse) -> Result<R>,
    /// Must always produce a well-formed result
    pub error: fn(&LambdaError) -> R,
}

/// Common surface of buffered and streaming handlers
pub trait TriggerHandler: Send + Sync + 'static {
    /// Raw trigger event
    type Event: Send + Sync + 'static;
    /// Result value seen by middleware (short-circuit and result callbacks)
    type Output: Send + 'static;

    /// Which orchestration path this handler drives
    const KIND: HandlerKind;

    fn from_event(&self, event: &Self::Event) -> Result<HttpRequest>;

    /// Convert any invocation error into a result; never fails
    fn to_error_result(&self, error: &LambdaError) -> Self::Output;
}

/// Buffered handler for event type `E` and result type `R`
///
/// # Examples
///
/// ```rust
/// use turul_gateway_aws_lambda::request_handler::{EventParser, RequestHandler, ResultGenerator};
/// use turul_gateway_aws_lambda::LambdaError;
/// use turul_gateway_http::{HttpRequest, HttpResponse, ResponseBody};
///
/// fn parse(path: &String) -> Result<HttpRequest, LambdaError> {
///     Ok(HttpRequest::new("GET").with_search(format!("path={}", path)))
/// }
///
/// fn success(_path: &String, response: HttpResponse) -> Result<String, LambdaError> {
///     match response.body {
///         ResponseBody::Complete(body) => Ok(body),
///         ResponseBody::Chunked(_) => Err(LambdaError::UnsupportedResponseKind),
///     }
/// }
///
/// fn error(err: &LambdaError) -> String {
///     err.to_string()
/// }
///
/// let handler = RequestHandler::new(
///     EventParser::Whole(parse),
///     ResultGenerator { success, error },
/// );
/// let request = handler.from_event(&"/health".to_string()).unwrap();
/// assert_eq!(request.search, "path=/health");
/// ```
pub struct RequestHandler<E, R> {
    parser: EventParser<E>,
    generator: ResultGenerator<E, R>,
}

impl<E, R> RequestHandler<E, R> {
    pub fn new(parser: EventParser<E>, generator: ResultGenerator<E, R>) -> Self {
        Self { parser, generator }
    }

    pub fn from_event(&self, event: &E) -> Result<HttpRequest> {
        self.parser.parse(event)
    }

    pub fn to_success_result(&self, event: &E, response: HttpResponse) -> Result<R> {
        (self.generator.success)(event, response)
    }

    pub fn to_error_result(&self, error: &LambdaError) -> R {
        (self.generator.error)(error)
    }
}

impl<E, R> TriggerHandler for RequestHandler<E, R>
where
    E: Send + Sync + 'static,
    R: Send + 'static,
{
    type Event = E;
    type Output = R;

    const KIND: HandlerKind = HandlerKind::Buffered;

    fn from_event(&self, event: &E) -> Result<HttpRequest> {
        RequestHandler::from_event(self, event)
    }

    fn to_error_result(&self, error: &LambdaError) -> R {
        RequestHandler::to_error_result(self, error)
    }
}

/// Metadata plus a complete body, as written to a response stream in one go
///
/// Produced by error conversion and by short-circuiting middleware. Result middleware
/// of a streaming handler also operates on this shape; see
/// [`LambdaEngineHandler::handle_streaming`](crate::LambdaEngineHandler::handle_streaming).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamResult {
    pub metadata: HttpMetadata,
    pub body: String,
}

impl StreamResult {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            metadata: HttpMetadata::new(status_code),
            body: body.into(),
        }
    }
}

/// Streaming handler for event type `E`
///
/// Defaults: metadata takes the engine status (or `200`) and headers, with
/// `set-cookie` values moved into `cookies`; errors become a `400` carrying the error
/// message as body.
pub struct StreamRequestHandler<E> {
    parser: EventParser<E>,
    metadata: fn(&HttpResponse) -> Result<HttpMetadata>,
    error: fn(&LambdaError) -> StreamResult,
}

impl<E> StreamRequestHandler<E> {
    pub fn new(parser: EventParser<E>) -> Self {
        Self {
            parser,
            metadata: adapter::stream_metadata,
            error: adapter::stream_error_result,
        }
    }

    /// Replace the metadata builder
    pub fn with_metadata_builder(
        mut self,
        metadata: fn(&HttpResponse) -> Result<HttpMetadata>,
    ) -> Self {
        self.metadata = metadata;
        self
    }

    /// Replace the error conversion; it must never fail
    pub fn with_error_result(mut self, error: fn(&LambdaError) -> StreamResult) -> Self {
        self.error = error;
        self
    }

    pub fn from_event(&self, event: &E) -> Result<HttpRequest> {
        self.parser.parse(event)
    }

    /// Status line and headers for a successful engine response
    pub async fn build_http_metadata(&self, response: &HttpResponse) -> Result<HttpMetadata> {
        (self.metadata)(response)
    }

    pub fn to_error_result(&self, error: &LambdaError) -> StreamResult {
        (self.error)(error)
    }
}

impl<E> TriggerHandler for StreamRequestHandler<E>
where
    E: Send + Sync + 'static,
{
    type Event = E;
    type Output = StreamResult;

    const KIND: HandlerKind = HandlerKind::Streaming;

    fn from_event(&self, event: &E) -> Result<HttpRequest> {
        StreamRequestHandler::from_event(self, event)
    }

    fn to_error_result(&self, error: &LambdaError) -> StreamResult {
        StreamRequestHandler::to_error_result(self, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Event {
        method: &'static str,
        content_type: &'static str,
        payload: &'static str,
    }

    fn parts_parser() -> EventParser<Event> {
        EventParser::Parts(ParserParts {
            method: |event| event.method.to_string(),
            headers: |event| [("content-type", event.content_type)].into_iter().collect(),
            query: |_| "a=1".to_string(),
            body: |event, headers| {
                adapter::parse_body(Some(event.payload), false, headers.get("content-type"))
            },
        })
    }

    #[test]
    fn test_parts_parser_reads_resolved_headers() {
        let request = parts_parser()
            .parse(&Event {
                method: "POST",
                content_type: "application/json",
                payload: r#"{"a":1}"#,
            })
            .unwrap();

        assert_eq!(request.method, "POST");
        assert_eq!(request.search, "a=1");
        assert_eq!(request.body, RequestBody::Json(json!({"a": 1})));
    }

    #[test]
    fn test_parts_parser_propagates_malformed_body() {
        let result = parts_parser().parse(&Event {
            method: "POST",
            content_type: "application/json",
            payload: "{not json",
        });
        assert!(matches!(result, Err(LambdaError::MalformedBody(_))));
    }

    #[test]
    fn test_whole_parser() {
        let parser: EventParser<Event> =
            EventParser::Whole(|event| Ok(HttpRequest::new(event.method)));
        let request = parser
            .parse(&Event {
                method: "DELETE",
                content_type: "",
                payload: "",
            })
            .unwrap();
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.body, RequestBody::Empty);
    }

    #[test]
    fn test_handler_kinds() {
        assert_eq!(
            <RequestHandler<Event, String> as TriggerHandler>::KIND,
            HandlerKind::Buffered
        );
        assert_eq!(
            <StreamRequestHandler<Event> as TriggerHandler>::KIND,
            HandlerKind::Streaming
        );
        assert_eq!(HandlerKind::Streaming.to_string(), "streaming");
    }

    #[tokio::test]
    async fn test_stream_handler_defaults() {
        let handler = StreamRequestHandler::new(parts_parser());

        let response = HttpResponse::complete(201, "ok")
            .with_header("content-type", "text/plain")
            .with_header("set-cookie", "a=1")
            .with_header("set-cookie", "b=2");
        let metadata = handler.build_http_metadata(&response).await.unwrap();
        assert_eq!(metadata.status_code, 201);
        assert_eq!(metadata.headers.get("content-type").map(String::as_str), Some("text/plain"));
        assert!(!metadata.headers.contains_key("set-cookie"));
        assert_eq!(metadata.cookies, Some(vec!["a=1".to_string(), "b=2".to_string()]));

        let error = handler.to_error_result(&LambdaError::UnknownEventType);
        assert_eq!(error, StreamResult::new(400, "Unknown event type"));
    }

    #[tokio::test]
    async fn test_stream_handler_overrides() {
        let handler = StreamRequestHandler::new(parts_parser())
            .with_metadata_builder(|response| {
                let mut metadata = HttpMetadata::new(response.status_or_default());
                metadata
                    .headers
                    .insert("cache-control".to_string(), "no-store".to_string());
                Ok(metadata)
            })
            .with_error_result(|error| StreamResult::new(502, format!("upstream: {}", error)));

        let metadata = handler
            .build_http_metadata(&HttpResponse::complete(200, ""))
            .await
            .unwrap();
        assert_eq!(metadata.headers["cache-control"], "no-store");

        let error = handler.to_error_result(&LambdaError::UnsupportedResponseKind);
        assert_eq!(error.metadata.status_code, 502);
        assert_eq!(error.body, "upstream: Only complete body type supported");
    }
}
