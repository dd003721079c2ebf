//! Reply envelope returned to the Lambda invocation layer.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::error::AdapterError;

/// Reply shape understood by API Gateway, ALB and Function URLs.
///
/// The body is always base64 and `is_base64_encoded` is always `true`, so the
/// invoking layer decodes it regardless of content type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEnvelope {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl ReplyEnvelope {
    /// Decodes the base64 body back into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidBase64`] if the body is not valid base64.
    pub fn decoded_body(&self) -> Result<Vec<u8>, AdapterError> {
        Ok(STANDARD.decode(&self.body)?)
    }
}
