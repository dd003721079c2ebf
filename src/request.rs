//! Request normalization: any [`InvocationEvent`] becomes one canonical
//! [`Request`].

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::HOST;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use lambda_runtime::tracing::debug;

use crate::context::InvocationContext;
use crate::models::event::Pairs;
use crate::models::{AdapterError, InvocationEvent};

/// Canonical HTTP request handed to the app.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Absolute `https://` URL rebuilt from the event.
    pub url: String,
    pub headers: HeaderMap,
    /// Body bytes, already base64-decoded when the event said so.
    pub body: Option<Vec<u8>>,
    pub context: InvocationContext,
}

impl Request {
    #[must_use]
    pub fn with_context(mut self, context: InvocationContext) -> Self {
        self.context = context;
        self
    }

    /// Path component of [`Request::url`].
    #[must_use]
    pub fn path(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        let path_and_query = rest.find('/').and_then(|i| rest.get(i..)).unwrap_or("");
        path_and_query.split('?').next().unwrap_or("")
    }

    /// Query component of [`Request::url`], without the `?`.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }
}

/// Parts shared by every shape once the variant-specific fields are resolved.
struct Parts {
    method: String,
    path: String,
    query: String,
    headers: Pairs,
    body: Option<String>,
    is_base64_encoded: bool,
    domain_name: Option<String>,
}

impl From<InvocationEvent> for Parts {
    fn from(event: InvocationEvent) -> Self {
        match event {
            InvocationEvent::Proxy(e) => Self {
                query: assemble_query(&e.query_string_parameters),
                method: e.http_method,
                path: e.path,
                headers: e.headers,
                body: e.body,
                is_base64_encoded: e.is_base64_encoded,
                domain_name: e.request_context.domain_name,
            },
            InvocationEvent::ProxyV2(e) => Self {
                method: e.http_method,
                path: e.raw_path,
                query: e.raw_query_string,
                headers: e.headers,
                body: e.body,
                is_base64_encoded: e.is_base64_encoded,
                domain_name: e.request_context.domain_name,
            },
            InvocationEvent::FunctionUrl(e) => Self {
                method: e.request_context.http.method,
                path: e.raw_path,
                query: e.raw_query_string,
                headers: e.headers,
                body: e.body,
                is_base64_encoded: e.is_base64_encoded,
                domain_name: e.request_context.domain_name,
            },
        }
    }
}

/// Builds the canonical request for an event.
///
/// The URL is always `https://{domainName}{path}`, followed by `?{query}` when
/// the query is non-empty. Headers with empty or null values are dropped and
/// repeated names keep the last value.
///
/// # Errors
///
/// Fails when the method or a header is not representable, when a base64 body
/// does not decode, or when the event has neither a domain name nor a `Host`
/// header.
pub fn normalize(event: InvocationEvent) -> Result<Request, AdapterError> {
    let kind = event.kind();
    let parts = Parts::from(event);

    let headers = build_headers(&parts.headers)?;
    let method = parse_method(&parts.method)?;

    let domain = match parts.domain_name.as_deref().filter(|d| !d.is_empty()) {
        Some(domain) => Cow::Borrowed(domain),
        None => headers
            .get(HOST)
            .and_then(|host| host.to_str().ok())
            .map(|host| Cow::Owned(host.to_string()))
            .ok_or(AdapterError::MissingHost)?,
    };
    let mut url = format!("https://{domain}{}", parts.path);
    if !parts.query.is_empty() {
        url.push('?');
        url.push_str(&parts.query);
    }

    let body = match parts.body.filter(|b| !b.is_empty()) {
        Some(body) if parts.is_base64_encoded => Some(STANDARD.decode(body)?),
        Some(body) => Some(body.into_bytes()),
        None => None,
    };

    debug!(
        kind = %kind,
        method = %method,
        url = %url,
        header_count = headers.len(),
        body_len = body.as_ref().map_or(0, Vec::len),
        "Normalized invocation event"
    );

    Ok(Request {
        method,
        url,
        headers,
        body,
        context: InvocationContext::default(),
    })
}

/// Joins `key=value` pairs with `&`, skipping null or empty values.
/// Keys and values are emitted as given.
fn assemble_query(parameters: &Pairs) -> String {
    parameters
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}={v}"))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn build_headers(pairs: &Pairs) -> Result<HeaderMap, AdapterError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
            continue;
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| AdapterError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| AdapterError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Parses the method token, upper-casing the standard methods the way fetch
/// implementations do. Extension methods keep their case.
fn parse_method(raw: &str) -> Result<Method, AdapterError> {
    const STANDARD_METHODS: [Method; 6] = [
        Method::DELETE,
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::POST,
        Method::PUT,
    ];

    if let Some(method) = STANDARD_METHODS
        .iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(raw))
    {
        return Ok(method.clone());
    }
    Method::from_bytes(raw.as_bytes()).map_err(|_| AdapterError::InvalidMethod(raw.to_string()))
}
