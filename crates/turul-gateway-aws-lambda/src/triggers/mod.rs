//! Trigger event adapters
//!
//! One module per supported Lambda trigger, each providing the event and result
//! shapes plus a ready-made [`RequestHandler`](crate::RequestHandler):
//!
//! - [`api_gateway_v1`] - API Gateway REST (payload format 1.0)
//! - [`api_gateway_v2`] - API Gateway HTTP API / function URLs (payload format 2.0),
//!   also available as a streaming handler
//! - [`alb`] - Application Load Balancer target
//! - [`auto`] - accepts any of the above and detects the trigger per event

use std::fmt;

use serde_json::Value;

use crate::error::{LambdaError, Result};

pub mod alb;
pub mod api_gateway_v1;
pub mod api_gateway_v2;
pub mod auto;

/// Supported trigger formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    ApiGatewayV1,
    ApiGatewayV2,
    Alb,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiGatewayV1 => f.write_str("API Gateway v1"),
            Self::ApiGatewayV2 => f.write_str("API Gateway v2"),
            Self::Alb => f.write_str("ALB"),
        }
    }
}

/// Determine the trigger that produced a raw event
///
/// Checked in order: `requestContext.http` (v2), `requestContext.elb` (load
/// balancer), top-level `httpMethod` (v1). The `version` field is not consulted.
pub fn classify_event(event: &Value) -> Result<TriggerKind> {
    let request_context = event.get("requestContext");
    let has_context_field = |field: &str| {
        request_context
            .and_then(|context| context.get(field))
            .is_some_and(|value| !value.is_null())
    };

    if has_context_field("http") {
        Ok(TriggerKind::ApiGatewayV2)
    } else if has_context_field("elb") {
        Ok(TriggerKind::Alb)
    } else if event.get("httpMethod").is_some_and(Value::is_string) {
        Ok(TriggerKind::ApiGatewayV1)
    } else {
        Err(LambdaError::UnknownEventType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_event() {
        let v2 = json!({"version": "2.0", "requestContext": {"http": {"method": "GET"}}});
        let alb = json!({"httpMethod": "GET", "requestContext": {"elb": {"targetGroupArn": "arn"}}});
        let v1 = json!({"httpMethod": "POST", "requestContext": {"stage": "prod"}});

        assert_eq!(classify_event(&v2).unwrap(), TriggerKind::ApiGatewayV2);
        assert_eq!(classify_event(&alb).unwrap(), TriggerKind::Alb);
        assert_eq!(classify_event(&v1).unwrap(), TriggerKind::ApiGatewayV1);
    }

    #[test]
    fn test_version_alone_does_not_select_v2() {
        let event = json!({"version": "2.0", "httpMethod": "GET"});
        assert_eq!(classify_event(&event).unwrap(), TriggerKind::ApiGatewayV1);
    }

    #[test]
    fn test_unknown_events() {
        for event in [
            json!({}),
            json!({"Records": []}),
            json!("text"),
            json!({"httpMethod": null}),
        ] {
            assert!(matches!(
                classify_event(&event),
                Err(LambdaError::UnknownEventType)
            ));
        }
    }
}
