//! Streaming invocation tests
//!
//! Uses a recording sink to check the exact order of metadata, chunk and close calls
//! for function URL (API Gateway v2) events in response-streaming mode.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde_json::json;

use turul_gateway_aws_lambda::StreamError;
use turul_gateway_aws_lambda::prelude::*;

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Metadata(HttpMetadata),
    Write(String),
    Close,
}

#[derive(Clone, Default)]
struct Recorder {
    ops: Arc<Mutex<Vec<Op>>>,
}

impl Recorder {
    fn push(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }

    fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }
}

struct RecordingStream(Recorder);

#[async_trait]
impl ResponseStream for RecordingStream {
    type Writer = RecordingWriter;

    async fn attach(self, metadata: HttpMetadata) -> Result<RecordingWriter, StreamError> {
        self.0.push(Op::Metadata(metadata));
        Ok(RecordingWriter(self.0))
    }
}

struct RecordingWriter(Recorder);

#[async_trait]
impl ResponseWriter for RecordingWriter {
    async fn write(&mut self, chunk: Bytes) -> Result<(), StreamError> {
        self.0
            .push(Op::Write(String::from_utf8_lossy(&chunk).into_owned()));
        Ok(())
    }

    async fn close(self) -> Result<(), StreamError> {
        self.0.push(Op::Close);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Mode {
    Complete,
    Chunked,
    FailBeforeResponse,
    FailMidStream,
}

struct StreamingEngine {
    mode: Mode,
    calls: AtomicUsize,
}

impl StreamingEngine {
    fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl HttpEngine for StreamingEngine {
    type Context = ();

    fn start_in_background(&self) {}

    async fn execute(
        &self,
        _request: HttpRequest,
        _context: ContextProducer<'_, ()>,
    ) -> Result<HttpResponse, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let response = match self.mode {
            Mode::Complete => HttpResponse::complete(200, "whole body"),
            Mode::Chunked => HttpResponse::chunked(
                200,
                async_stream::stream! {
                    yield Ok("foo".to_string());
                    yield Ok("bar".to_string());
                },
            ),
            Mode::FailBeforeResponse => return Err(EngineError::execution("engine down")),
            Mode::FailMidStream => HttpResponse::chunked(
                200,
                async_stream::stream! {
                    yield Ok("foo".to_string());
                    yield Err(EngineError::stream("stream broke"));
                    yield Ok("never".to_string());
                },
            ),
        };

        Ok(response
            .with_header("content-type", "text/plain")
            .with_header("set-cookie", "session=1"))
    }
}

type StreamHandler =
    LambdaEngineHandler<StreamingEngine, StreamRequestHandler<ApiGatewayV2Event>, ()>;

fn build(engine: &Arc<StreamingEngine>) -> StreamHandler {
    LambdaEngineHandlerBuilder::with_shared_engine(
        Arc::clone(engine),
        api_gateway_v2_stream_request_handler(),
    )
    .build()
}

fn event() -> ApiGatewayV2Event {
    serde_json::from_value(json!({
        "version": "2.0",
        "rawQueryString": "",
        "headers": {"accept": "text/event-stream"},
        "requestContext": {"http": {"method": "GET"}}
    }))
    .unwrap()
}

fn ok_metadata() -> HttpMetadata {
    let mut metadata = HttpMetadata::new(200);
    metadata
        .headers
        .insert("content-type".to_string(), "text/plain".to_string());
    metadata.push_cookie("session=1");
    metadata
}

#[tokio::test]
async fn test_chunked_body_writes_metadata_once_then_each_chunk() {
    let engine = StreamingEngine::new(Mode::Chunked);
    let recorder = Recorder::default();

    build(&engine)
        .handle_streaming(event(), RecordingStream(recorder.clone()), ())
        .await
        .unwrap();

    assert_eq!(
        recorder.ops(),
        vec![
            Op::Metadata(ok_metadata()),
            Op::Write("foo".to_string()),
            Op::Write("bar".to_string()),
            Op::Close,
        ]
    );
}

#[tokio::test]
async fn test_complete_body_is_written_once() {
    let engine = StreamingEngine::new(Mode::Complete);
    let recorder = Recorder::default();

    build(&engine)
        .handle_streaming(event(), RecordingStream(recorder.clone()), ())
        .await
        .unwrap();

    assert_eq!(
        recorder.ops(),
        vec![
            Op::Metadata(ok_metadata()),
            Op::Write("whole body".to_string()),
            Op::Close,
        ]
    );
}

#[tokio::test]
async fn test_error_before_metadata_sends_error_response() {
    let engine = StreamingEngine::new(Mode::FailBeforeResponse);
    let recorder = Recorder::default();

    build(&engine)
        .handle_streaming(event(), RecordingStream(recorder.clone()), ())
        .await
        .unwrap();

    assert_eq!(
        recorder.ops(),
        vec![
            Op::Metadata(HttpMetadata::new(400)),
            Op::Write("engine down".to_string()),
            Op::Close,
        ]
    );
}

#[tokio::test]
async fn test_mid_stream_error_is_appended_as_chunk() {
    let engine = StreamingEngine::new(Mode::FailMidStream);
    let recorder = Recorder::default();

    build(&engine)
        .handle_streaming(event(), RecordingStream(recorder.clone()), ())
        .await
        .unwrap();

    assert_eq!(
        recorder.ops(),
        vec![
            Op::Metadata(ok_metadata()),
            Op::Write("foo".to_string()),
            Op::Write("stream broke".to_string()),
            Op::Close,
        ]
    );
}

#[tokio::test]
async fn test_short_circuit_writes_middleware_result() {
    let engine = StreamingEngine::new(Mode::Chunked);
    let recorder = Recorder::default();

    let handler: StreamHandler = LambdaEngineHandlerBuilder::with_shared_engine(
        Arc::clone(&engine),
        api_gateway_v2_stream_request_handler(),
    )
    .middleware_fn(|event: &mut ApiGatewayV2Event| {
        Box::pin(async move {
            if !event.headers.contains_key("authorization") {
                return Ok(MiddlewareAction::Respond(StreamResult::new(401, "denied")));
            }
            Ok(MiddlewareAction::Continue)
        })
    })
    .build();

    handler
        .handle_streaming(event(), RecordingStream(recorder.clone()), ())
        .await
        .unwrap();

    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        recorder.ops(),
        vec![
            Op::Metadata(HttpMetadata::new(401)),
            Op::Write("denied".to_string()),
            Op::Close,
        ]
    );
}

#[tokio::test]
async fn test_result_middleware_runs_before_metadata_is_sent() {
    let engine = StreamingEngine::new(Mode::Chunked);
    let recorder = Recorder::default();

    let handler: StreamHandler = LambdaEngineHandlerBuilder::with_shared_engine(
        Arc::clone(&engine),
        api_gateway_v2_stream_request_handler(),
    )
    .middleware_fn(|_event: &mut ApiGatewayV2Event| {
        Box::pin(async move {
            Ok(MiddlewareAction::on_result(|result: &mut StreamResult| {
                Box::pin(async move {
                    result.metadata.push_cookie("seen=1");
                    result.body.push_str("prefix:");
                })
            }))
        })
    })
    .build();

    handler
        .handle_streaming(event(), RecordingStream(recorder.clone()), ())
        .await
        .unwrap();

    let mut metadata = ok_metadata();
    metadata.push_cookie("seen=1");
    assert_eq!(
        recorder.ops(),
        vec![
            Op::Metadata(metadata),
            Op::Write("prefix:".to_string()),
            Op::Write("foo".to_string()),
            Op::Write("bar".to_string()),
            Op::Close,
        ]
    );
}

#[tokio::test]
async fn test_middleware_failure_still_runs_registered_result_middleware() {
    let engine = StreamingEngine::new(Mode::Chunked);
    let recorder = Recorder::default();

    let handler: StreamHandler = LambdaEngineHandlerBuilder::with_shared_engine(
        Arc::clone(&engine),
        api_gateway_v2_stream_request_handler(),
    )
    .middleware_fn(|_event: &mut ApiGatewayV2Event| {
        Box::pin(async move {
            Ok(MiddlewareAction::on_result(|result: &mut StreamResult| {
                Box::pin(async move {
                    result.metadata.push_cookie("seen=1");
                })
            }))
        })
    })
    .middleware_fn(|event: &mut ApiGatewayV2Event| {
        Box::pin(async move {
            if !event.headers.contains_key("authorization") {
                return Err(MiddlewareError::unauthenticated("missing token"));
            }
            Ok(MiddlewareAction::Continue)
        })
    })
    .build();

    handler
        .handle_streaming(event(), RecordingStream(recorder.clone()), ())
        .await
        .unwrap();

    let mut metadata = HttpMetadata::new(400);
    metadata.push_cookie("seen=1");
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        recorder.ops(),
        vec![
            Op::Metadata(metadata),
            Op::Write("Authentication required: missing token".to_string()),
            Op::Close,
        ]
    );
}

#[tokio::test]
async fn test_metadata_builder_failure_sends_error_response() {
    let engine = StreamingEngine::new(Mode::Complete);
    let recorder = Recorder::default();

    let handler: StreamHandler = LambdaEngineHandlerBuilder::with_shared_engine(
        Arc::clone(&engine),
        api_gateway_v2_stream_request_handler().with_metadata_builder(|_response| {
            Err(LambdaError::Engine(EngineError::execution("metadata unavailable")))
        }),
    )
    .build();

    handler
        .handle_streaming(event(), RecordingStream(recorder.clone()), ())
        .await
        .unwrap();

    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        recorder.ops(),
        vec![
            Op::Metadata(HttpMetadata::new(400)),
            Op::Write("metadata unavailable".to_string()),
            Op::Close,
        ]
    );
}

#[tokio::test]
async fn test_channel_stream_produces_wire_format() {
    let engine = StreamingEngine::new(Mode::Chunked);
    let (stream, receiver) = ChannelResponseStream::channel(16);

    build(&engine)
        .handle_streaming(event(), stream, ())
        .await
        .unwrap();

    let frames: Vec<Bytes> = receiver.collect().await;
    assert_eq!(frames.len(), 3);

    let (prelude, delimiter) = frames[0].split_at(frames[0].len() - 8);
    assert_eq!(delimiter, &[0u8; 8]);
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(prelude).unwrap(),
        json!({
            "statusCode": 200,
            "headers": {"content-type": "text/plain"},
            "cookies": ["session=1"]
        })
    );
    assert_eq!(frames[1], "foo");
    assert_eq!(frames[2], "bar");
}
