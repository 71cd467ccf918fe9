//! Echo Engine Lambda Example
//!
//! Deploys an engine that answers every request with a JSON description of the
//! canonical request it received. The function accepts API Gateway REST, HTTP API and
//! ALB events; the trigger is detected per invocation.
//!
//! Usage:
//! ```bash
//! cargo lambda build --package turul-gateway-aws-lambda --bin lambda-echo-engine
//! cargo lambda deploy --package turul-gateway-aws-lambda --bin lambda-echo-engine
//!
//! # Or run locally (requires cargo-lambda)
//! cargo lambda watch --package turul-gateway-aws-lambda --bin lambda-echo-engine
//! ```
//!
//! Environment:
//! - `LOG_LEVEL`: tracing level (default `INFO`)

use std::collections::BTreeMap;
use std::env;

use async_trait::async_trait;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::{Value, json};
use tracing::{info, warn};
use turul_gateway_aws_lambda::prelude::*;

/// Per-request context built from the Lambda invocation
struct EchoContext {
    request_id: String,
}

struct EchoEngine;

#[async_trait]
impl HttpEngine for EchoEngine {
    type Context = EchoContext;

    fn start_in_background(&self) {
        info!("Echo engine ready");
    }

    async fn execute(
        &self,
        request: HttpRequest,
        context: ContextProducer<'_, EchoContext>,
    ) -> std::result::Result<HttpResponse, EngineError> {
        let context = context.resolve().await?;

        let headers: BTreeMap<&str, &str> = request.headers.iter().collect();
        let body = match &request.body {
            RequestBody::Empty => Value::Null,
            RequestBody::Text(text) => Value::String(text.clone()),
            RequestBody::Json(value) => value.clone(),
        };

        let echo = json!({
            "requestId": context.request_id,
            "method": request.method,
            "search": request.search,
            "headers": headers,
            "body": body,
        });

        Ok(HttpResponse::complete(200, echo.to_string())
            .with_header("content-type", "application/json"))
    }
}

/// Initialize logging - JSON for Lambda/CloudWatch, human-readable for local development
fn init_logging() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());

    if env::var("AWS_EXECUTION_ENV").is_ok() {
        tracing_subscriber::fmt()
            .with_max_level(log_level.parse().unwrap_or(tracing::Level::INFO))
            .with_target(false)
            .without_time()
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(log_level.parse().unwrap_or(tracing::Level::INFO))
            .init();
    }

    info!("🚀 Logging initialized at level: {}", log_level);
}

#[tokio::main]
async fn main() -> std::result::Result<(), Error> {
    init_logging();

    let handler = LambdaEngineHandlerBuilder::<_, _, lambda_runtime::Context>::new(
        EchoEngine,
        any_event_request_handler(),
    )
    .middleware_fn(|event: &mut Value| {
        Box::pin(async move {
            if event.get("httpMethod").and_then(Value::as_str) == Some("OPTIONS") {
                return Ok(MiddlewareAction::Respond(AnyEventResult::ApiGatewayV1(
                    ApiGatewayV1Result {
                        status_code: 204,
                        ..Default::default()
                    },
                )));
            }
            Ok(MiddlewareAction::Continue)
        })
    })
    .middleware_fn(|_event: &mut Value| {
        Box::pin(async move {
            Ok(MiddlewareAction::on_result(|result: &mut AnyEventResult| {
                Box::pin(async move {
                    if result.status_code() >= 400 {
                        warn!("Returning error result: {}", result.body());
                    }
                    result.insert_header("x-powered-by", "turul-gateway");
                })
            }))
        })
    })
    .context(|args| {
        let request_id = args.context.request_id.clone();
        Box::pin(async move { Ok(EchoContext { request_id }) })
    })
    .build();

    info!("🚀 Echo engine Lambda ready");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move { Ok::<_, Error>(handler.handle(event.payload, event.context).await) }
    }))
    .await
}
