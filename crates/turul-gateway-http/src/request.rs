//! Canonical request record handed to the engine

use serde_json::Value;

use crate::headers::HeaderMap;

/// Request body after content-type driven parsing
///
/// Adapters produce [`RequestBody::Json`] only for `application/json` payloads and
/// [`RequestBody::Text`] only for `text/plain`; everything else becomes
/// [`RequestBody::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body, or a content type the adapter does not forward
    #[default]
    Empty,
    /// Raw `text/plain` payload
    Text(String),
    /// Parsed `application/json` payload
    Json(Value),
}

impl RequestBody {
    /// True for [`RequestBody::Empty`] and for an empty text payload
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::Json(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Normalised request consumed by an [`HttpEngine`](crate::HttpEngine)
///
/// `search` is the raw query string (no leading `?`), never split into pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub headers: HeaderMap,
    pub search: String,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_emptiness() {
        assert!(RequestBody::Empty.is_empty());
        assert!(RequestBody::Text(String::new()).is_empty());
        assert!(!RequestBody::Text("x".into()).is_empty());
        assert!(!RequestBody::Json(json!({})).is_empty());
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::new("POST")
            .with_header("content-type", "application/json")
            .with_search("a=1")
            .with_body(RequestBody::Json(json!({"query": "{ hello }"})));

        assert_eq!(request.method, "POST");
        assert_eq!(request.headers.get("content-type"), Some("application/json"));
        assert_eq!(request.search, "a=1");
        assert_eq!(request.body.as_json(), Some(&json!({"query": "{ hello }"})));
    }
}
