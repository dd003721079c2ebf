//! Error types for the adapter.
//!
//! Every failure between receiving a raw invocation event and returning a
//! reply envelope is expressed as an [`AdapterError`]. At the Lambda boundary
//! the error is converted into a [`Diagnostic`] whose `error_type` names the
//! variant, so CloudWatch shows which stage failed.

use lambda_runtime::Diagnostic;
use thiserror::Error;

use super::event::EventKind;

/// Errors raised while adapting an invocation.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The payload carries neither `path` nor `rawPath`.
    #[error("event matches no known shape: expected a `path` or `rawPath` field")]
    UnrecognizedEvent,
    /// The payload was classified but does not deserialize into that shape.
    #[error("malformed {kind} event: {source}")]
    InvalidEvent {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
    /// Neither `requestContext.domainName` nor a `Host` header is available.
    #[error("event carries no domain name and no host header")]
    MissingHost,
    /// The HTTP method is not a valid token.
    #[error("invalid HTTP method: {0:?}")]
    InvalidMethod(String),
    /// A request header name or value cannot be represented.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
    /// The event declared a base64 body that does not decode.
    #[error("request body is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    /// The app failed to produce a response.
    #[error("app failed: {0:#}")]
    App(anyhow::Error),
    /// The response body stream yielded an error.
    #[error("failed to read response body: {0:#}")]
    Body(anyhow::Error),
    /// The response body was already drained.
    #[error("response body already consumed")]
    BodyConsumed,
}

impl AdapterError {
    /// Stable name of the variant, used as the Lambda `errorType`.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::UnrecognizedEvent => "UnrecognizedEvent",
            Self::InvalidEvent { .. } => "InvalidEvent",
            Self::MissingHost => "MissingHost",
            Self::InvalidMethod(_) => "InvalidMethod",
            Self::InvalidHeader { .. } => "InvalidHeader",
            Self::InvalidBase64(_) => "InvalidBase64",
            Self::App(_) => "AppError",
            Self::Body(_) => "BodyError",
            Self::BodyConsumed => "BodyConsumed",
        }
    }
}

impl From<AdapterError> for Diagnostic {
    fn from(error: AdapterError) -> Self {
        Self {
            error_type: error.error_type().to_string(),
            error_message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_carries_variant_name() {
        let diagnostic = Diagnostic::from(AdapterError::BodyConsumed);
        assert_eq!(diagnostic.error_type, "BodyConsumed");
        assert_eq!(diagnostic.error_message, "response body already consumed");
    }

    #[test]
    fn test_app_error_keeps_cause_chain() {
        let cause = anyhow::anyhow!("connection reset").context("upstream call failed");
        let error = AdapterError::App(cause);
        assert_eq!(error.error_type(), "AppError");
        assert_eq!(
            error.to_string(),
            "app failed: upstream call failed: connection reset"
        );
    }

    #[test]
    fn test_invalid_event_names_shape() {
        let source = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let error = AdapterError::InvalidEvent {
            kind: EventKind::FunctionUrl,
            source,
        };
        assert!(error.to_string().starts_with("malformed function-url event"));
    }
}
