//! Application Load Balancer target integration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use turul_gateway_http::{HttpRequest, HttpResponse};

use crate::adapter::{
    self, CompleteResponse, ERROR_STATUS_CODE, build_query_string, headers_from_map, nullable,
    nullable_map,
};
use crate::error::{LambdaError, Result};
use crate::request_handler::{EventParser, RequestHandler, ResultGenerator};

/// Event delivered to a Lambda registered as a load balancer target
///
/// With multi-value headers enabled on the target group the load balancer sends
/// `multiValueHeaders` instead of `headers`; both are accepted. The result mirrors
/// whichever mode the event arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbEvent {
    pub request_context: AlbRequestContext,
    pub http_method: String,
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
    #[serde(default, deserialize_with = "nullable_map")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub query_string_parameters: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "nullable_map")]
    pub multi_value_query_string_parameters: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub is_base64_encoded: bool,
}

impl AlbEvent {
    /// Whether the target group has multi-value headers enabled
    pub fn is_multi_value(&self) -> bool {
        !self.multi_value_headers.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbRequestContext {
    pub elb: AlbTargetGroup,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbTargetGroup {
    pub target_group_arn: String,
}

/// Result returned to the load balancer
///
/// `status_description` (e.g. `"200 OK"`) is passed through untouched; adapters
/// never compute it. In multi-value mode the load balancer reads only
/// `multiValueHeaders`, so every header goes there; otherwise it carries the keys
/// with more than one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbResult {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

fn parse_event(event: &AlbEvent) -> Result<HttpRequest> {
    let mut headers = headers_from_map(&event.headers);
    for (key, values) in &event.multi_value_headers {
        for value in values {
            headers.append(key.as_str(), value.as_str());
        }
    }

    let body = adapter::parse_body(
        event.body.as_deref(),
        event.is_base64_encoded,
        headers.get("content-type"),
    )?;

    Ok(HttpRequest {
        method: event.http_method.clone(),
        search: build_query_string(
            &event.query_string_parameters,
            &event.multi_value_query_string_parameters,
        ),
        headers,
        body,
    })
}

pub(crate) fn event_parser() -> EventParser<AlbEvent> {
    EventParser::Whole(parse_event)
}

/// Load balancer result for a complete engine response
pub(crate) fn complete_result(response: HttpResponse, multi_value: bool) -> Result<AlbResult> {
    let complete = CompleteResponse::from_response(response)?;
    let multi_value_headers = if multi_value {
        complete.grouped_headers()
    } else {
        complete.repeated_headers()
    };

    Ok(AlbResult {
        status_code: complete.status_code,
        status_description: None,
        headers: complete.headers.to_flat_map(),
        multi_value_headers,
        body: complete.body,
        is_base64_encoded: false,
    })
}

fn success_result(event: &AlbEvent, response: HttpResponse) -> Result<AlbResult> {
    complete_result(response, event.is_multi_value())
}

fn error_result(error: &LambdaError) -> AlbResult {
    AlbResult {
        status_code: ERROR_STATUS_CODE,
        body: error.to_string(),
        ..Default::default()
    }
}

/// Buffered handler for load balancer events
pub fn alb_request_handler() -> RequestHandler<AlbEvent, AlbResult> {
    RequestHandler::new(
        event_parser(),
        ResultGenerator {
            success: success_result,
            error: error_result,
        },
    )
}
