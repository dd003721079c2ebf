pub mod error;
pub mod event;
pub mod reply;

pub use error::AdapterError;
pub use event::{EventKind, FunctionUrlEvent, InvocationEvent, ProxyEvent, ProxyEventV2};
pub use reply::ReplyEnvelope;
