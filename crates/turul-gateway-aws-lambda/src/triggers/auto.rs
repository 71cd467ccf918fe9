//! Handler accepting every supported trigger
//!
//! The raw event is classified once with [`classify_event`] and then parsed with the
//! matching trigger's parser. Success results take the detected trigger's own shape,
//! wrapped in [`AnyEventResult`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use turul_gateway_http::{HttpRequest, HttpResponse};

use super::alb::{self, AlbResult};
use super::api_gateway_v1::{self, ApiGatewayV1Result};
use super::api_gateway_v2::{self, ApiGatewayV2Result};
use super::{TriggerKind, classify_event};
use crate::error::{LambdaError, Result};
use crate::request_handler::{EventParser, RequestHandler, ResultGenerator};

/// Result of an auto-detected invocation, serialized as the inner trigger result
///
/// Error results, including those for events matching no trigger, use the REST proxy
/// shape. Its fields are a subset of the HTTP API and load balancer result fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyEventResult {
    ApiGatewayV1(ApiGatewayV1Result),
    ApiGatewayV2(ApiGatewayV2Result),
    Alb(AlbResult),
}

impl AnyEventResult {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ApiGatewayV1(result) => result.status_code,
            Self::ApiGatewayV2(result) => result.status_code,
            Self::Alb(result) => result.status_code,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::ApiGatewayV1(result) => &result.body,
            Self::ApiGatewayV2(result) => &result.body,
            Self::Alb(result) => &result.body,
        }
    }

    /// Set a single-valued header, replacing earlier values under the same key
    ///
    /// Load balancer results using `multiValueHeaders` get the value there as well.
    pub fn insert_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        match self {
            Self::ApiGatewayV1(result) => {
                result.multi_value_headers.remove(&key);
                result.headers.insert(key, value);
            }
            Self::ApiGatewayV2(result) => {
                result.headers.insert(key, value);
            }
            Self::Alb(result) => {
                if !result.multi_value_headers.is_empty() {
                    result
                        .multi_value_headers
                        .insert(key.clone(), vec![value.clone()]);
                }
                result.headers.insert(key, value);
            }
        }
    }
}

fn typed_event<E: DeserializeOwned>(trigger: TriggerKind, event: &Value) -> Result<E> {
    E::deserialize(event).map_err(|source| LambdaError::InvalidEvent { trigger, source })
}

fn parse_any_event(event: &Value) -> Result<HttpRequest> {
    let trigger = classify_event(event)?;
    debug!("Detected {} event", trigger);

    match trigger {
        TriggerKind::ApiGatewayV1 => {
            api_gateway_v1::event_parser().parse(&typed_event(trigger, event)?)
        }
        TriggerKind::ApiGatewayV2 => {
            api_gateway_v2::event_parser().parse(&typed_event(trigger, event)?)
        }
        TriggerKind::Alb => alb::event_parser().parse(&typed_event(trigger, event)?),
    }
}

fn success_result(event: &Value, response: HttpResponse) -> Result<AnyEventResult> {
    match classify_event(event)? {
        TriggerKind::ApiGatewayV1 => {
            api_gateway_v1::complete_result(response).map(AnyEventResult::ApiGatewayV1)
        }
        TriggerKind::ApiGatewayV2 => {
            api_gateway_v2::complete_result(response).map(AnyEventResult::ApiGatewayV2)
        }
        TriggerKind::Alb => {
            let multi_value = event
                .get("multiValueHeaders")
                .and_then(Value::as_object)
                .is_some_and(|headers| !headers.is_empty());
            alb::complete_result(response, multi_value).map(AnyEventResult::Alb)
        }
    }
}

fn error_result(error: &LambdaError) -> AnyEventResult {
    AnyEventResult::ApiGatewayV1(api_gateway_v1::error_result(error))
}

/// Buffered handler for any supported trigger event
///
/// Events matching no trigger fail with [`LambdaError::UnknownEventType`], which is
/// converted into a `400` result like every other invocation error.
pub fn any_event_request_handler() -> RequestHandler<Value, AnyEventResult> {
    RequestHandler::new(
        EventParser::Whole(parse_any_event),
        ResultGenerator {
            success: success_result,
            error: error_result,
        },
    )
}
