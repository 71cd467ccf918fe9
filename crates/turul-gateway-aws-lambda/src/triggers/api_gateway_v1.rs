//! API Gateway REST proxy integration (payload format 1.0)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use turul_gateway_http::{HeaderMap, HttpResponse, RequestBody};

use crate::adapter::{
    self, CompleteResponse, ERROR_STATUS_CODE, build_query_string, headers_from_map, nullable,
    nullable_map,
};
use crate::error::{LambdaError, Result};
use crate::request_handler::{EventParser, ParserParts, RequestHandler, ResultGenerator};

/// Proxy event delivered by a REST API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV1Event {
    #[serde(default, deserialize_with = "nullable")]
    pub resource: String,
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    pub http_method: String,
    #[serde(default, deserialize_with = "nullable_map")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub query_string_parameters: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub multi_value_query_string_parameters: BTreeMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub path_parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub request_context: Value,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
}

/// Proxy result accepted by REST APIs
///
/// Load balancers and HTTP APIs accept this shape too, which is why the
/// auto-detecting handler returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV1Result {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Headers the engine repeated, such as `set-cookie`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

pub(crate) fn event_parser() -> EventParser<ApiGatewayV1Event> {
    EventParser::Parts(ParserParts {
        method: |event| event.http_method.clone(),
        headers: |event| headers_from_map(&event.headers),
        query: |event| {
            build_query_string(
                &event.query_string_parameters,
                &event.multi_value_query_string_parameters,
            )
        },
        body: parse_body,
    })
}

fn parse_body(event: &ApiGatewayV1Event, headers: &HeaderMap) -> Result<RequestBody> {
    adapter::parse_body(
        event.body.as_deref(),
        event.is_base64_encoded,
        headers.get("content-type"),
    )
}

/// REST proxy result for a complete engine response
///
/// Keys with several values also go to `multiValueHeaders`, which the gateway merges
/// over `headers`.
pub(crate) fn complete_result(response: HttpResponse) -> Result<ApiGatewayV1Result> {
    let complete = CompleteResponse::from_response(response)?;
    Ok(ApiGatewayV1Result {
        status_code: complete.status_code,
        headers: complete.headers.to_flat_map(),
        multi_value_headers: complete.repeated_headers(),
        body: complete.body,
        is_base64_encoded: false,
    })
}

fn success_result(
    _event: &ApiGatewayV1Event,
    response: HttpResponse,
) -> Result<ApiGatewayV1Result> {
    complete_result(response)
}

pub(crate) fn error_result(error: &LambdaError) -> ApiGatewayV1Result {
    ApiGatewayV1Result {
        status_code: ERROR_STATUS_CODE,
        body: error.to_string(),
        ..Default::default()
    }
}

/// Buffered handler for REST API proxy events
pub fn api_gateway_v1_request_handler() -> RequestHandler<ApiGatewayV1Event, ApiGatewayV1Result> {
    RequestHandler::new(
        event_parser(),
        ResultGenerator {
            success: success_result,
            error: error_result,
        },
    )
}
