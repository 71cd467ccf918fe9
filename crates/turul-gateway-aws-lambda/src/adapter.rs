//! Conversion utilities shared by the trigger adapters
//!
//! Trigger modules are thin data mappers; body decoding, query reconstruction and the
//! result-side header handling they have in common live here.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer};
use tracing::{debug, trace};
use turul_gateway_http::{HeaderMap, HttpMetadata, HttpResponse, RequestBody, ResponseBody};

use crate::error::{LambdaError, Result};
use crate::request_handler::StreamResult;

/// Status code of every error result
pub const ERROR_STATUS_CODE: u16 = 400;

const JSON_MEDIA_TYPE: &str = "application/json";
const TEXT_MEDIA_TYPE: &str = "text/plain";
const SET_COOKIE: &str = "set-cookie";
const CONTENT_LENGTH: &str = "content-length";

/// Deserialize a value the gateway may send as `null`, falling back to its default
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a map that may be `null` and may hold `null` values
///
/// Gateways send `null` both for absent maps and for header values without content.
pub(crate) fn nullable_map<'de, D, V>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de> + Default,
{
    let map = Option::<BTreeMap<String, Option<V>>>::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

/// Media type of a `content-type` value without parameters (`application/json; charset=utf-8` → `application/json`)
pub fn media_type_essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}

/// Decode an event body into the canonical request body
///
/// Only `application/json` (parsed) and `text/plain` (raw) bodies are passed on; any
/// other content type, or none, yields [`RequestBody::Empty`]. Base64 payloads are
/// decoded first and must be UTF-8.
pub fn parse_body(
    body: Option<&str>,
    is_base64_encoded: bool,
    content_type: Option<&str>,
) -> Result<RequestBody> {
    let Some(body) = body.filter(|body| !body.is_empty()) else {
        return Ok(RequestBody::Empty);
    };

    let media_type = content_type.map(media_type_essence).unwrap_or_default();
    let is_json = media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE);
    if !is_json && !media_type.eq_ignore_ascii_case(TEXT_MEDIA_TYPE) {
        debug!(
            "Ignoring body with unsupported content type '{}'",
            media_type
        );
        return Ok(RequestBody::Empty);
    }

    let body = decode_body(body, is_base64_encoded)?;
    if is_json {
        serde_json::from_str(&body)
            .map(RequestBody::Json)
            .map_err(|e| LambdaError::malformed_body(e.to_string()))
    } else {
        Ok(RequestBody::Text(body.into_owned()))
    }
}

fn decode_body(body: &str, is_base64_encoded: bool) -> Result<Cow<'_, str>> {
    if !is_base64_encoded {
        return Ok(Cow::Borrowed(body));
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| LambdaError::malformed_body(format!("invalid base64: {}", e)))?;
    trace!("Decoded {} base64 body bytes", bytes.len());
    String::from_utf8(bytes)
        .map(Cow::Owned)
        .map_err(|e| LambdaError::malformed_body(format!("invalid UTF-8: {}", e)))
}

/// Rebuild a raw query string from single- and multi-value parameter maps
///
/// A key present in the multi-value map emits every one of its values; the single
/// value for that key is not repeated. Keys are emitted in sorted order.
pub fn build_query_string(
    single: &BTreeMap<String, String>,
    multi: &BTreeMap<String, Vec<String>>,
) -> String {
    let keys: BTreeSet<&String> = single.keys().chain(multi.keys()).collect();
    let mut query = url::form_urlencoded::Serializer::new(String::new());

    for key in keys {
        match multi.get(key).filter(|values| !values.is_empty()) {
            Some(values) => {
                for value in values {
                    query.append_pair(key, value);
                }
            }
            None => {
                if let Some(value) = single.get(key) {
                    query.append_pair(key, value);
                }
            }
        }
    }

    query.finish()
}

/// Request headers from a trigger's flat header map
pub fn headers_from_map(headers: &BTreeMap<String, String>) -> HeaderMap {
    headers.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

/// Status, headers and body of a buffered success result
///
/// `content-length` is set to the UTF-8 byte length of the body, replacing any value the
/// engine sent under whatever casing.
#[derive(Debug)]
pub struct CompleteResponse {
    pub status_code: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl CompleteResponse {
    /// Split a response whose body must be complete
    pub fn from_response(response: HttpResponse) -> Result<Self> {
        let status_code = response.status_or_default();
        let ResponseBody::Complete(body) = response.body else {
            return Err(LambdaError::UnsupportedResponseKind);
        };

        let mut headers = response.headers;
        headers.remove_ignore_ascii_case(CONTENT_LENGTH);
        headers.insert(CONTENT_LENGTH, body.len().to_string());
        Ok(Self {
            status_code,
            headers,
            body,
        })
    }

    /// Remove `set-cookie` headers in any casing, returning their values in order
    pub fn take_cookies(&mut self) -> Vec<String> {
        self.headers.remove_ignore_ascii_case(SET_COOKIE)
    }

    /// Every header value grouped under its key, in insertion order per key
    pub fn grouped_headers(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in self.headers.iter() {
            grouped
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
        }
        grouped
    }

    /// Only the keys carrying more than one value, which a flat header map would lose
    pub fn repeated_headers(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped = self.grouped_headers();
        grouped.retain(|_, values| values.len() > 1);
        grouped
    }
}

/// Default streaming metadata: engine status (or `200`), headers collapsed to one value
/// per key, and `set-cookie` values moved into `cookies`
pub fn stream_metadata(response: &HttpResponse) -> Result<HttpMetadata> {
    let mut metadata = HttpMetadata::new(response.status_or_default());
    for (key, value) in response.headers.iter() {
        if key.eq_ignore_ascii_case(SET_COOKIE) {
            metadata.push_cookie(value);
        } else {
            metadata.headers.insert(key.to_string(), value.to_string());
        }
    }
    Ok(metadata)
}

/// Default streaming error result: `400` with the error message as body
pub fn stream_error_result(error: &LambdaError) -> StreamResult {
    StreamResult::new(ERROR_STATUS_CODE, error.to_string())
}
