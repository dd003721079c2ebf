//! Canonical response produced by the app and its serialization into a
//! [`ReplyEnvelope`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use lambda_runtime::tracing::{debug, warn};

use crate::config::BodyMode;
use crate::models::{AdapterError, ReplyEnvelope};

/// Chunked body stream.
pub type BodyStream = BoxStream<'static, anyhow::Result<Vec<u8>>>;

/// Single-pass response body.
///
/// The stream is taken on the first read; any later read fails with
/// [`AdapterError::BodyConsumed`].
pub struct Body {
    stream: Option<BodyStream>,
}

impl Body {
    #[must_use]
    pub fn empty() -> Self {
        Self::from_stream(stream::empty())
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self::from_stream(stream::iter([Ok(bytes)]))
    }

    #[must_use]
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = anyhow::Result<Vec<u8>>> + Send + 'static,
    {
        Self {
            stream: Some(stream.boxed()),
        }
    }

    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.stream.is_none()
    }

    /// Drains the stream into a single buffer.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::BodyConsumed`] on a second read and
    /// [`AdapterError::Body`] if the stream yields an error.
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>, AdapterError> {
        self.fold(Vec::new(), |buffer, chunk| buffer.extend_from_slice(&chunk))
            .await
    }

    /// Drains the stream, decoding each chunk as UTF-8 on its own and
    /// replacing invalid sequences.
    ///
    /// # Errors
    ///
    /// Same as [`Body::read_to_end`].
    pub async fn read_to_string_lossy(&mut self) -> Result<String, AdapterError> {
        let mut replaced = false;
        let text = self
            .fold(String::new(), |text, chunk| {
                match String::from_utf8_lossy(&chunk) {
                    Cow::Borrowed(valid) => text.push_str(valid),
                    Cow::Owned(lossy) => {
                        replaced = true;
                        text.push_str(&lossy);
                    }
                }
            })
            .await?;
        if replaced {
            warn!("Response body contained invalid UTF-8; bytes were replaced");
        }
        Ok(text)
    }

    async fn fold<T>(
        &mut self,
        mut accumulator: T,
        mut append: impl FnMut(&mut T, Vec<u8>),
    ) -> Result<T, AdapterError> {
        let mut stream = self.stream.take().ok_or(AdapterError::BodyConsumed)?;
        while let Some(chunk) = stream.next().await {
            append(&mut accumulator, chunk.map_err(AdapterError::Body)?);
        }
        Ok(accumulator)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// Canonical HTTP response returned by the app.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Appends a header. Repeated names are kept; the reply keeps the last.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::from_bytes(bytes));
        self
    }

    #[must_use]
    pub fn with_stream<S>(mut self, stream: S) -> Self
    where
        S: Stream<Item = anyhow::Result<Vec<u8>>> + Send + 'static,
    {
        self.body = Some(Body::from_stream(stream));
        self
    }
}

/// Serializes a response with the default [`BodyMode::Raw`].
///
/// # Errors
///
/// Propagates body stream failures as [`AdapterError::Body`].
pub async fn serialize(response: Response) -> Result<ReplyEnvelope, AdapterError> {
    serialize_with(response, BodyMode::Raw).await
}

/// Drains the body, base64-encodes it and copies status and headers.
///
/// Header names are already case-insensitive; when a name repeats, the last
/// value ends up in the reply. `is_base64_encoded` is always `true`.
///
/// # Errors
///
/// Propagates body stream failures as [`AdapterError::Body`].
pub async fn serialize_with(
    response: Response,
    mode: BodyMode,
) -> Result<ReplyEnvelope, AdapterError> {
    let Response {
        status,
        headers,
        body,
    } = response;
    let mut body = body.unwrap_or_default();

    let encoded = match mode {
        BodyMode::Raw => STANDARD.encode(body.read_to_end().await?),
        BodyMode::Utf8Lossy => STANDARD.encode(body.read_to_string_lossy().await?),
    };

    let mut reply_headers = HashMap::with_capacity(headers.keys_len());
    for (name, value) in &headers {
        reply_headers.insert(
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }

    debug!(
        status = status.as_u16(),
        header_count = reply_headers.len(),
        encoded_len = encoded.len(),
        "Serialized response"
    );

    Ok(ReplyEnvelope {
        status_code: status.as_u16(),
        headers: reply_headers,
        body: encoded,
        is_base64_encoded: true,
    })
}
