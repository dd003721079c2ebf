//! Adapter configuration.

use std::str::FromStr;

use lambda_runtime::tracing::warn;

/// Environment variable selecting the [`BodyMode`].
pub const BODY_MODE_ENV: &str = "LAMBDA_ADAPTER_BODY_MODE";

/// How the response body is turned into the reply's base64 payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyMode {
    /// Encode the raw bytes. Binary safe.
    #[default]
    Raw,
    /// Decode each chunk as UTF-8 (replacing invalid sequences) before
    /// encoding. Matches adapters that treat every body as text.
    Utf8Lossy,
}

impl FromStr for BodyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "utf8-lossy" | "utf8_lossy" => Ok(Self::Utf8Lossy),
            other => Err(format!("unknown body mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    pub body_mode: BodyMode,
}

impl AdapterConfig {
    /// Reads the configuration from the process environment.
    /// Unknown values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(BODY_MODE_ENV).ok().as_deref())
    }

    fn from_value(body_mode: Option<&str>) -> Self {
        let body_mode = body_mode.map_or_else(BodyMode::default, |value| {
            value.parse::<BodyMode>().unwrap_or_else(|e: String| {
                warn!(error = %e, variable = BODY_MODE_ENV, "Falling back to raw body mode");
                BodyMode::default()
            })
        });
        Self { body_mode }
    }
}
