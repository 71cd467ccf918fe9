//! Canonical response records returned by the engine

use std::collections::BTreeMap;
use std::fmt;

use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::headers::HeaderMap;

/// Incremental body: ordered string chunks, each of which may fail
pub type ChunkStream = BoxStream<'static, Result<String, EngineError>>;

/// Response body as produced by the engine
pub enum ResponseBody {
    /// The whole body is available at once
    Complete(String),
    /// The body arrives as an asynchronous sequence of chunks
    Chunked(ChunkStream),
}

impl ResponseBody {
    /// Build a chunked body from any stream of chunk results
    pub fn chunked<S>(chunks: S) -> Self
    where
        S: futures::Stream<Item = Result<String, EngineError>> + Send + 'static,
    {
        Self::Chunked(chunks.boxed())
    }

    /// Build a chunked body from chunks that are already in memory
    pub fn from_chunks<I, T>(chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
        T: Into<String> + 'static,
    {
        Self::chunked(stream::iter(chunks).map(|chunk| Ok(chunk.into())))
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self, Self::Chunked(_))
    }

    /// Wire name of the body kind (`complete` or `chunked`)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Complete(_) => "complete",
            Self::Chunked(_) => "chunked",
        }
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete(body) => f.debug_tuple("Complete").field(body).finish(),
            Self::Chunked(_) => f.write_str("Chunked(..)"),
        }
    }
}

/// Response produced by an [`HttpEngine`](crate::HttpEngine)
///
/// `status` is optional; adapters default it to `200`.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: Option<u16>,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl HttpResponse {
    /// Response with a complete body
    pub fn complete(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            headers: HeaderMap::new(),
            body: ResponseBody::Complete(body.into()),
        }
    }

    /// Response with a chunked body
    pub fn chunked<S>(status: u16, chunks: S) -> Self
    where
        S: futures::Stream<Item = Result<String, EngineError>> + Send + 'static,
    {
        Self {
            status: Some(status),
            headers: HeaderMap::new(),
            body: ResponseBody::chunked(chunks),
        }
    }

    /// Append a header (engines may repeat keys such as `set-cookie`)
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(key, value);
        self
    }

    /// Status code with the adapter default applied
    pub fn status_or_default(&self) -> u16 {
        self.status.unwrap_or(200)
    }
}

/// Status line and headers delivered once, ahead of a streamed body
///
/// Serialises to the shape Lambda response streaming expects in its metadata prelude:
/// `{"statusCode":200,"headers":{...},"cookies":[...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMetadata {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<String>>,
}

impl HttpMetadata {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    /// Add a cookie, creating the cookie list on first use
    pub fn push_cookie(&mut self, cookie: impl Into<String>) {
        self.cookies.get_or_insert_with(Vec::new).push(cookie.into());
    }
}
