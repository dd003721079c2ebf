//! Lambda entry points tying normalization, the app and serialization
//! together.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use lambda_runtime::tracing::{debug, error, info};
use lambda_runtime::{Diagnostic, Error, LambdaEvent, service_fn};
use serde_json::Value;

use crate::config::AdapterConfig;
use crate::context::{IdGenerator, InvocationContext, UuidGenerator};
use crate::models::{AdapterError, InvocationEvent, ReplyEnvelope};
use crate::request::{Request, normalize};
use crate::response::{Response, serialize_with};

/// The HTTP application being adapted.
///
/// Any `Fn(Request) -> impl Future<Output = anyhow::Result<Response>>`
/// implements it.
#[async_trait]
pub trait App: Send + Sync {
    async fn fetch(&self, request: Request) -> anyhow::Result<Response>;
}

#[async_trait]
impl<F, Fut> App for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
{
    async fn fetch(&self, request: Request) -> anyhow::Result<Response> {
        self(request).await
    }
}

/// Adapts an [`App`] to Lambda invocation events.
pub struct Adapter<A> {
    app: Arc<A>,
    config: AdapterConfig,
    ids: Arc<dyn IdGenerator>,
}

impl<A> Clone for Adapter<A> {
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            config: self.config,
            ids: Arc::clone(&self.ids),
        }
    }
}

impl<A: App> Adapter<A> {
    #[must_use]
    pub fn new(app: A) -> Self {
        Self::with_config(app, AdapterConfig::default())
    }

    #[must_use]
    pub fn with_config(app: A, config: AdapterConfig) -> Self {
        Self {
            app: Arc::new(app),
            config,
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Replaces the identifier source exposed through [`InvocationContext`].
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    #[must_use]
    pub const fn config(&self) -> AdapterConfig {
        self.config
    }

    /// Runs one invocation: classify, normalize, fetch, serialize.
    ///
    /// # Errors
    ///
    /// Any [`AdapterError`], converted into a `Diagnostic` whose
    /// `error_type` names the failing stage.
    pub async fn invoke(&self, event: LambdaEvent<Value>) -> Result<ReplyEnvelope, Diagnostic> {
        let (payload, context) = event.into_parts();
        self.dispatch(payload, context.request_id)
            .await
            .map_err(|e| {
                error!(error_type = e.error_type(), error = %e, "Invocation failed");
                Diagnostic::from(e)
            })
    }

    /// [`Adapter::invoke`] without the Lambda wrapper types.
    ///
    /// # Errors
    ///
    /// Returns the [`AdapterError`] of whichever stage failed.
    pub async fn dispatch(
        &self,
        payload: Value,
        request_id: String,
    ) -> Result<ReplyEnvelope, AdapterError> {
        debug!(payload = ?payload, "Received invocation event");

        let event = InvocationEvent::classify(payload)?;
        let context = InvocationContext::new(request_id, Arc::clone(&self.ids));
        let request = normalize(event)?.with_context(context);
        let (method, url) = (request.method.clone(), request.url.clone());

        let response = self.app.fetch(request).await.map_err(AdapterError::App)?;
        let reply = serialize_with(response, self.config.body_mode).await?;

        info!(
            method = %method,
            url = %url,
            status = reply.status_code,
            "Handled request"
        );
        Ok(reply)
    }
}

/// Wraps an app into a closure accepted by [`lambda_runtime::service_fn`].
pub fn handle<A>(
    app: A,
) -> impl Fn(LambdaEvent<Value>) -> BoxFuture<'static, Result<ReplyEnvelope, Diagnostic>> + Clone
where
    A: App + 'static,
{
    handle_with(Adapter::new(app))
}

/// Like [`handle`], for an already configured [`Adapter`].
pub fn handle_with<A>(
    adapter: Adapter<A>,
) -> impl Fn(LambdaEvent<Value>) -> BoxFuture<'static, Result<ReplyEnvelope, Diagnostic>> + Clone
where
    A: App + 'static,
{
    move |event| {
        let adapter = adapter.clone();
        async move { adapter.invoke(event).await }.boxed()
    }
}

/// Serves the app on the Lambda runtime until shutdown.
///
/// # Errors
///
/// Returns an error if the runtime loop fails.
pub async fn run<A>(app: A) -> Result<(), Error>
where
    A: App + 'static,
{
    run_with_config(app, AdapterConfig::default()).await
}

/// [`run`] with an explicit configuration.
///
/// # Errors
///
/// Returns an error if the runtime loop fails.
pub async fn run_with_config<A>(app: A, config: AdapterConfig) -> Result<(), Error>
where
    A: App + 'static,
{
    info!(body_mode = ?config.body_mode, "Starting Lambda fetch adapter");
    lambda_runtime::run(service_fn(handle_with(Adapter::with_config(app, config)))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use lambda_runtime::Context;
    use serde_json::json;

    async fn teapot(_request: Request) -> anyhow::Result<Response> {
        Ok(Response::new(StatusCode::IM_A_TEAPOT).with_body("short and stout"))
    }

    #[tokio::test]
    async fn test_invoke_returns_reply() {
        let adapter = Adapter::new(teapot);
        let event = LambdaEvent::new(
            json!({
                "rawPath": "/",
                "requestContext": {"domainName": "example.com", "http": {"method": "GET"}}
            }),
            Context::default(),
        );

        let reply = adapter.invoke(event).await.unwrap();
        assert_eq!(reply.status_code, 418);
        assert_eq!(reply.decoded_body().unwrap(), b"short and stout");
    }

    #[tokio::test]
    async fn test_invoke_maps_errors_to_diagnostic() {
        let adapter = Adapter::new(teapot);
        let event = LambdaEvent::new(json!({"detail-type": "Scheduled Event"}), Context::default());

        let diagnostic = adapter.invoke(event).await.unwrap_err();
        assert_eq!(diagnostic.error_type, "UnrecognizedEvent");
    }

    #[tokio::test]
    async fn test_handle_closure_is_reusable() {
        let handler = handle(teapot);
        for _ in 0..2 {
            let event = LambdaEvent::new(
                json!({
                    "httpMethod": "GET",
                    "path": "/",
                    "requestContext": {"domainName": "example.com"}
                }),
                Context::default(),
            );
            assert_eq!(handler(event).await.unwrap().status_code, 418);
        }
    }
}
