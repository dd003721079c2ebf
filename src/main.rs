use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};
use lambda_fetch_adapter::{AdapterConfig, Request, Response, run_with_config};
use lambda_runtime::Error;
use serde_json::{Map, Value, json};

/// Echoes the normalized request back as JSON.
async fn echo(request: Request) -> anyhow::Result<Response> {
    let headers: Map<String, Value> = request
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();

    let payload = json!({
        "method": request.method.as_str(),
        "url": request.url.as_str(),
        "path": request.path(),
        "query": request.query(),
        "headers": headers,
        "body": request.body.as_deref().map(String::from_utf8_lossy),
        "requestId": request.context.request_id.as_str(),
        "traceId": request.context.new_id(),
    });

    Ok(Response::new(StatusCode::OK)
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .with_body(serde_json::to_vec(&payload)?))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Use Lambda runtime's built-in tracing subscriber for CloudWatch Logs
    lambda_runtime::tracing::init_default_subscriber();

    run_with_config(echo, AdapterConfig::from_env()).await
}
