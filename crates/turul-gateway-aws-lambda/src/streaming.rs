//! Response streaming sink for Lambda
//!
//! A streamed response is written in three steps: metadata is attached exactly once,
//! body chunks are written in order, and the writer is closed. [`ResponseStream`]
//! encodes the once-only attachment in the type system: `attach` consumes the stream
//! and hands back the [`ResponseWriter`] that body bytes go to.
//!
//! [`ChannelResponseStream`] produces the Lambda response-streaming wire format:
//! the JSON metadata prelude, eight NUL bytes, then the raw body bytes.

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace};
use turul_gateway_http::HttpMetadata;

/// Separator between the metadata prelude and the body
pub const PRELUDE_DELIMITER: [u8; 8] = [0; 8];

/// Output sink failures
#[derive(Error, Debug)]
pub enum StreamError {
    /// The consuming side of the stream has gone away
    #[error("response stream closed by receiver")]
    Closed,

    /// Metadata could not be encoded as a prelude
    #[error("failed to encode metadata prelude: {0}")]
    Prelude(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Streaming response primitive supplied by the host runtime
#[async_trait]
pub trait ResponseStream: Send {
    type Writer: ResponseWriter;

    /// Send status line and headers; no body byte may precede this call
    async fn attach(self, metadata: HttpMetadata) -> Result<Self::Writer, StreamError>;
}

/// Body sink returned by [`ResponseStream::attach`]
#[async_trait]
pub trait ResponseWriter: Send {
    async fn write(&mut self, chunk: Bytes) -> Result<(), StreamError>;

    /// Finish the response; nothing may be written afterwards
    async fn close(self) -> Result<(), StreamError>;
}

/// Encode metadata as a response-streaming prelude (JSON followed by eight NUL bytes)
pub fn encode_prelude(metadata: &HttpMetadata) -> Result<Bytes, StreamError> {
    let json = serde_json::to_vec(metadata)?;
    let mut prelude = BytesMut::with_capacity(json.len() + PRELUDE_DELIMITER.len());
    prelude.put_slice(&json);
    prelude.put_slice(&PRELUDE_DELIMITER);
    Ok(prelude.freeze())
}

/// Channel-backed [`ResponseStream`]
///
/// Everything written ends up, in order, on the paired [`ReceiverStream`], which can be
/// handed to the runtime as a streaming body. Dropping the writer (or closing it) ends
/// the receiver stream.
///
/// # Examples
///
/// ```rust
/// use bytes::Bytes;
/// use futures::StreamExt;
/// use turul_gateway_aws_lambda::streaming::{ChannelResponseStream, ResponseStream, ResponseWriter};
/// use turul_gateway_http::HttpMetadata;
///
/// # tokio_test::block_on(async {
/// let (stream, receiver) = ChannelResponseStream::channel(8);
///
/// let mut writer = stream.attach(HttpMetadata::new(200)).await.unwrap();
/// writer.write(Bytes::from("hello")).await.unwrap();
/// writer.close().await.unwrap();
///
/// let frames: Vec<Bytes> = receiver.collect().await;
/// assert_eq!(frames.len(), 2);
/// assert!(frames[0].ends_with(&[0; 8]));
/// assert_eq!(frames[1], "hello");
/// # });
/// ```
#[derive(Debug)]
pub struct ChannelResponseStream {
    sender: mpsc::Sender<Bytes>,
}

impl ChannelResponseStream {
    /// Create a stream and its receiving side with room for `buffer` frames
    pub fn channel(buffer: usize) -> (Self, ReceiverStream<Bytes>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self { sender }, ReceiverStream::new(receiver))
    }
}

#[async_trait]
impl ResponseStream for ChannelResponseStream {
    type Writer = ChannelResponseWriter;

    async fn attach(self, metadata: HttpMetadata) -> Result<ChannelResponseWriter, StreamError> {
        let prelude = encode_prelude(&metadata)?;
        debug!(
            "Attaching stream metadata: status {}",
            metadata.status_code
        );
        self.sender
            .send(prelude)
            .await
            .map_err(|_| StreamError::Closed)?;
        Ok(ChannelResponseWriter {
            sender: self.sender,
        })
    }
}

/// Writer half of a [`ChannelResponseStream`]
#[derive(Debug)]
pub struct ChannelResponseWriter {
    sender: mpsc::Sender<Bytes>,
}

#[async_trait]
impl ResponseWriter for ChannelResponseWriter {
    async fn write(&mut self, chunk: Bytes) -> Result<(), StreamError> {
        trace!("Writing {} byte chunk", chunk.len());
        self.sender
            .send(chunk)
            .await
            .map_err(|_| StreamError::Closed)
    }

    async fn close(self) -> Result<(), StreamError> {
        trace!("Closing response stream");
        drop(self.sender);
        Ok(())
    }
}
