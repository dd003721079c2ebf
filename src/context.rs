//! Per-invocation values handed to the app alongside the request.
//!
//! Apps that need unique identifiers get them from the [`IdGenerator`]
//! carried here rather than from process-wide state, so tests can substitute
//! a deterministic source.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Source of unique identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Invocation-scoped context attached to every [`crate::request::Request`].
#[derive(Clone)]
pub struct InvocationContext {
    /// Lambda request id of the current invocation, empty outside Lambda.
    pub request_id: String,
    ids: Arc<dyn IdGenerator>,
}

impl InvocationContext {
    #[must_use]
    pub fn new(request_id: impl Into<String>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            request_id: request_id.into(),
            ids,
        }
    }

    /// Produces a fresh identifier from the configured generator.
    #[must_use]
    pub fn new_id(&self) -> String {
        self.ids.generate()
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new(String::new(), Arc::new(UuidGenerator))
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationContext")
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Sequence(AtomicUsize);

    impl IdGenerator for Sequence {
        fn generate(&self) -> String {
            format!("id-{}", self.0.fetch_add(1, Ordering::Relaxed))
        }
    }

    #[test]
    fn test_uuid_generator_yields_distinct_ids() {
        let ids = UuidGenerator;
        let first = ids.generate();
        assert_eq!(first.len(), 36);
        assert_ne!(first, ids.generate());
    }

    #[test]
    fn test_context_uses_substituted_generator() {
        let context = InvocationContext::new("req-1", Arc::new(Sequence(AtomicUsize::new(0))));
        assert_eq!(context.request_id, "req-1");
        assert_eq!(context.new_id(), "id-0");
        assert_eq!(context.new_id(), "id-1");
    }
}
