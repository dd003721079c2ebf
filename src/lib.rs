//! Runs a fetch-style HTTP app on AWS Lambda.
//!
//! Invocation events from REST API Gateway, ALB, gateway-fronted Function URLs
//! and bare Function URLs are classified, normalized into one [`Request`],
//! passed to the [`App`], and the resulting [`Response`] is serialized into a
//! base64 [`ReplyEnvelope`].

pub mod adapter;
pub mod config;
pub mod context;
pub mod models;
pub mod request;
pub mod response;

pub use adapter::{Adapter, App, handle, handle_with, run, run_with_config};
pub use config::{AdapterConfig, BodyMode};
pub use context::{IdGenerator, InvocationContext, UuidGenerator};
pub use models::{AdapterError, EventKind, InvocationEvent, ReplyEnvelope};
pub use request::{Request, normalize};
pub use response::{Body, Response, serialize, serialize_with};
