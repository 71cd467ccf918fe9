//! Error handling for Lambda gateway adapters

use thiserror::Error;
use turul_gateway_http::EngineError;

use crate::middleware::MiddlewareError;
use crate::streaming::StreamError;
use crate::triggers::TriggerKind;

/// Result type for Lambda gateway operations
pub type Result<T> = std::result::Result<T, LambdaError>;

/// Errors that can occur while adapting a Lambda invocation
///
/// Every variant except [`LambdaError::Stream`] is caught at
/// the invocation boundary and converted into a trigger-specific error result.
#[derive(Error, Debug)]
pub enum LambdaError {
    /// Content type declares JSON or text but the payload cannot be decoded
    #[error("Malformed body: {0}")]
    MalformedBody(String),

    /// Event matches none of the supported trigger shapes
    #[error("Unknown event type")]
    UnknownEventType,

    /// Event was classified but does not deserialize into its trigger's shape
    #[error("Invalid {trigger} event: {source}")]
    InvalidEvent {
        trigger: TriggerKind,
        #[source]
        source: serde_json::Error,
    },

    /// Engine produced a chunked body for a trigger that cannot frame one
    #[error("Only complete body type supported")]
    UnsupportedResponseKind,

    /// Engine execution failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Request-phase middleware failed
    #[error(transparent)]
    Middleware(#[from] MiddlewareError),

    /// Streaming output sink failure
    #[error("Response stream error: {0}")]
    Stream(#[from] StreamError),
}

impl LambdaError {
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::MalformedBody(message.into())
    }
}
