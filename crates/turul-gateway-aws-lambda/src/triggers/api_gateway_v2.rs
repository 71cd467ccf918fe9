//! API Gateway HTTP API and Lambda function URL integration (payload format 2.0)
//!
//! Payload 2.0 carries cookies outside the header map in both directions. Request
//! cookies are folded into a `cookie` header; `set-cookie` response headers are moved
//! into the result's `cookies` list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use turul_gateway_http::{HeaderMap, HttpResponse, RequestBody};

use crate::adapter::{
    self, CompleteResponse, ERROR_STATUS_CODE, headers_from_map, nullable, nullable_map,
};
use crate::error::{LambdaError, Result};
use crate::request_handler::{
    EventParser, ParserParts, RequestHandler, ResultGenerator, StreamRequestHandler,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV2Event {
    #[serde(default, deserialize_with = "nullable")]
    pub version: String,
    #[serde(default, deserialize_with = "nullable")]
    pub route_key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub raw_path: String,
    #[serde(default, deserialize_with = "nullable")]
    pub raw_query_string: String,
    #[serde(default, deserialize_with = "nullable")]
    pub cookies: Vec<String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub query_string_parameters: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub path_parameters: BTreeMap<String, String>,
    pub request_context: ApiGatewayV2RequestContext,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV2RequestContext {
    pub http: ApiGatewayV2Http,
    /// Remaining context fields (`requestId`, `authorizer`, `stage`, ...) as received
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV2Http {
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub source_ip: String,
    #[serde(default)]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV2Result {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<String>>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

pub(crate) fn event_parser() -> EventParser<ApiGatewayV2Event> {
    EventParser::Parts(ParserParts {
        method: |event| event.request_context.http.method.clone(),
        headers: parse_headers,
        query: |event| event.raw_query_string.clone(),
        body: parse_body,
    })
}

fn parse_headers(event: &ApiGatewayV2Event) -> HeaderMap {
    let mut headers = headers_from_map(&event.headers);
    if !event.cookies.is_empty() && !headers.contains_key("cookie") {
        headers.insert("cookie", event.cookies.join("; "));
    }
    headers
}

fn parse_body(event: &ApiGatewayV2Event, headers: &HeaderMap) -> Result<RequestBody> {
    adapter::parse_body(
        event.body.as_deref(),
        event.is_base64_encoded,
        headers.get("content-type"),
    )
}

/// HTTP API result for a complete engine response, with `set-cookie` moved to `cookies`
pub(crate) fn complete_result(response: HttpResponse) -> Result<ApiGatewayV2Result> {
    let mut complete = CompleteResponse::from_response(response)?;
    let cookies = complete.take_cookies();

    Ok(ApiGatewayV2Result {
        status_code: complete.status_code,
        headers: complete.headers.to_flat_map(),
        cookies: (!cookies.is_empty()).then_some(cookies),
        body: complete.body,
        is_base64_encoded: false,
    })
}

fn success_result(
    _event: &ApiGatewayV2Event,
    response: HttpResponse,
) -> Result<ApiGatewayV2Result> {
    complete_result(response)
}

fn error_result(error: &LambdaError) -> ApiGatewayV2Result {
    ApiGatewayV2Result {
        status_code: ERROR_STATUS_CODE,
        body: error.to_string(),
        ..Default::default()
    }
}

/// Buffered handler for HTTP API events
pub fn api_gateway_v2_request_handler() -> RequestHandler<ApiGatewayV2Event, ApiGatewayV2Result> {
    RequestHandler::new(
        event_parser(),
        ResultGenerator {
            success: success_result,
            error: error_result,
        },
    )
}

/// Streaming handler for function URLs invoked in `RESPONSE_STREAM` mode
pub fn api_gateway_v2_stream_request_handler() -> StreamRequestHandler<ApiGatewayV2Event> {
    StreamRequestHandler::new(event_parser())
}
