//! Invocation event shapes delivered by the Lambda runtime.
//!
//! Three overlapping payloads reach the function depending on what sits in
//! front of it:
//!
//! - REST API Gateway / ALB proxy events carry `path` and a flat
//!   `queryStringParameters` map.
//! - Function URL events routed through a gateway carry `rawPath`,
//!   `rawQueryString` and a top-level `httpMethod`.
//! - Bare Function URL events carry `rawPath`, `rawQueryString` and nest the
//!   method under `requestContext.http.method`.
//!
//! [`InvocationEvent::classify`] is the single place where the shape is
//! decided. Everything downstream matches on the enum.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::error::AdapterError;

/// Ordered `name -> optional value` pairs, as found in `headers` and
/// `queryStringParameters`.
pub type Pairs = Vec<(String, Option<String>)>;

/// Which of the known payload shapes an event has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// REST API Gateway or load balancer proxy event (`path`).
    Proxy,
    /// Function URL event behind a gateway (`rawPath` + `httpMethod`).
    ProxyV2,
    /// Bare Function URL event (`rawPath`, method in `requestContext.http`).
    FunctionUrl,
}

impl EventKind {
    /// Determines the shape from key presence alone.
    ///
    /// `path` wins over `rawPath`; among `rawPath` events a top-level
    /// `httpMethod` marks the gateway variant.
    #[must_use]
    pub fn detect(payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;
        if object.contains_key("path") {
            Some(Self::Proxy)
        } else if object.contains_key("rawPath") {
            if object.contains_key("httpMethod") {
                Some(Self::ProxyV2)
            } else {
                Some(Self::FunctionUrl)
            }
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::ProxyV2 => "proxy-v2",
            Self::FunctionUrl => "function-url",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `requestContext` of the two gateway-style shapes.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default)]
    pub domain_name: Option<String>,
}

/// `requestContext` of a bare Function URL event.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionUrlRequestContext {
    #[serde(default)]
    pub domain_name: Option<String>,
    pub http: HttpDescription,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HttpDescription {
    pub method: String,
}

/// REST API Gateway / ALB proxy event.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    pub http_method: String,
    pub path: String,
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub query_string_parameters: Pairs,
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub headers: Pairs,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: RequestContext,
}

/// Function URL event forwarded by a gateway.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEventV2 {
    pub http_method: String,
    pub raw_path: String,
    #[serde(default)]
    pub raw_query_string: String,
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub headers: Pairs,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: RequestContext,
}

/// Function URL event invoked directly.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionUrlEvent {
    pub raw_path: String,
    #[serde(default)]
    pub raw_query_string: String,
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub headers: Pairs,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    pub request_context: FunctionUrlRequestContext,
}

/// A classified invocation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationEvent {
    Proxy(ProxyEvent),
    ProxyV2(ProxyEventV2),
    FunctionUrl(FunctionUrlEvent),
}

impl InvocationEvent {
    /// Classifies a raw payload and deserializes it into the matching shape.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnrecognizedEvent`] when the payload has neither
    /// `path` nor `rawPath`, and [`AdapterError::InvalidEvent`] when a required
    /// field of the detected shape is missing or mistyped.
    pub fn classify(payload: Value) -> Result<Self, AdapterError> {
        let kind = EventKind::detect(&payload).ok_or(AdapterError::UnrecognizedEvent)?;
        let event = match kind {
            EventKind::Proxy => serde_json::from_value(payload).map(Self::Proxy),
            EventKind::ProxyV2 => serde_json::from_value(payload).map(Self::ProxyV2),
            EventKind::FunctionUrl => serde_json::from_value(payload).map(Self::FunctionUrl),
        };
        event.map_err(|source| AdapterError::InvalidEvent { kind, source })
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Proxy(_) => EventKind::Proxy,
            Self::ProxyV2(_) => EventKind::ProxyV2,
            Self::FunctionUrl(_) => EventKind::FunctionUrl,
        }
    }
}

impl<'de> Deserialize<'de> for InvocationEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let payload = Value::deserialize(deserializer)?;
        Self::classify(payload).map_err(serde::de::Error::custom)
    }
}

/// Reads a JSON object of strings (or nulls) into ordered pairs.
/// A `null` or absent map yields no pairs.
fn ordered_pairs<'de, D>(deserializer: D) -> Result<Pairs, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> serde::de::Visitor<'de> for PairsVisitor {
        type Value = Pairs;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of string or null values")
        }

        fn visit_none<E>(self) -> Result<Pairs, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Pairs, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Pairs, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(self)
        }

        fn visit_map<A>(self, mut access: A) -> Result<Pairs, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(pair) = access.next_entry::<String, Option<String>>()? {
                pairs.push(pair);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_option(PairsVisitor)
}
