//! Request-scoped logging context.
//!
//! A `LogContext` is threaded explicitly down a call chain and carries the
//! three pieces of per-request logging state:
//!
//! - accumulated key/value fields, oldest first
//! - a force-debug marker that makes every level visible for this chain only
//! - an optional sink that replaces the logger's configured output
//!
//! Every `with_*` method returns a new context; the receiver (and anything
//! derived from it earlier) is left untouched.

use crate::sink::LogSink;
use ctxlog_shared::{ErrorEnvelope, LogValue};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Immutable, cheaply clonable logging context.
#[derive(Clone, Default)]
pub struct LogContext {
    fields: Arc<[LogValue]>,
    force_debug: bool,
    sink: Option<Arc<dyn LogSink>>,
}

impl LogContext {
    /// Empty context: no fields, no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a child context with `kv` appended after the existing fields.
    #[must_use]
    pub fn with_fields<I>(&self, kv: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let fields: Arc<[LogValue]> = self
            .fields
            .iter()
            .cloned()
            .chain(kv.into_iter().map(Into::into))
            .collect();

        Self {
            fields,
            force_debug: self.force_debug,
            sink: self.sink.clone(),
        }
    }

    /// Accumulated fields as a flat key/value sequence, oldest first.
    #[must_use]
    pub fn fields(&self) -> &[LogValue] {
        &self.fields
    }

    /// Return a child context that forces debug-level logging.
    #[must_use]
    pub fn with_force_debug(&self) -> Self {
        Self {
            force_debug: true,
            ..self.clone()
        }
    }

    /// Whether debug-level logging is forced for this context.
    #[must_use]
    pub const fn is_force_debug(&self) -> bool {
        self.force_debug
    }

    /// Return a child context whose records go to `sink` instead of the
    /// logger's configured output.
    #[must_use]
    pub fn with_sink(&self, sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink: Some(sink),
            ..self.clone()
        }
    }

    /// Sink override, if any.
    #[must_use]
    pub fn sink(&self) -> Option<&Arc<dyn LogSink>> {
        self.sink.as_ref()
    }

    /// Annotate `source` with a message, call-site detail, and this context's
    /// fields.
    ///
    /// The returned error renders as `"{message}: {source}"` and exposes `kv`
    /// followed by the context fields as structured tuples, so logging it
    /// carries the request detail even when logged from another context.
    pub fn wrap_error<E, I>(&self, source: E, message: impl Into<String>, kv: I) -> ErrorEnvelope
    where
        E: StdError + Send + Sync + 'static,
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let tuples = kv
            .into_iter()
            .map(Into::into)
            .chain(self.fields.iter().cloned());
        ErrorEnvelope::wrap(source, message, tuples)
    }
}

impl fmt::Debug for LogContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LogContext")
            .field("fields", &self.fields)
            .field("force_debug", &self.force_debug)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxlog_shared::{StructuredError, kv};
    use std::io;

    fn keys(fields: &[LogValue]) -> Vec<&str> {
        fields.iter().step_by(2).filter_map(LogValue::as_key).collect()
    }

    #[test]
    fn fields_accumulate_without_touching_ancestors() {
        let root = LogContext::new();
        let parent = root.with_fields(kv!("a", 1));
        let child = parent.with_fields(kv!("b", 2));
        let sibling = parent.with_fields(kv!("c", 3));

        assert!(root.fields().is_empty());
        assert_eq!(keys(parent.fields()), vec!["a"]);
        assert_eq!(keys(child.fields()), vec!["a", "b"]);
        assert_eq!(keys(sibling.fields()), vec!["a", "c"]);
    }

    #[test]
    fn force_debug_is_scoped_to_children() {
        let parent = LogContext::new().with_fields(kv!("a", 1));
        let forced = parent.with_force_debug();

        assert!(!parent.is_force_debug());
        assert!(forced.is_force_debug());
        assert_eq!(keys(forced.fields()), vec!["a"]);
        assert!(forced.with_fields(kv!("b", 2)).is_force_debug());
    }

    #[test]
    fn sink_override_is_inherited_by_children() {
        struct NullSink;

        impl LogSink for NullSink {
            fn write_line(&self, _line: &[u8]) -> io::Result<()> {
                Ok(())
            }
        }

        let parent = LogContext::new();
        let with_sink = parent.with_sink(Arc::new(NullSink));

        assert!(parent.sink().is_none());
        assert!(with_sink.sink().is_some());
        assert!(with_sink.with_fields(kv!("k", "v")).sink().is_some());
    }

    #[test]
    fn wrap_error_appends_context_fields_after_call_detail() {
        let ctx = LogContext::new().with_fields(kv!("ctx", 123));
        let error = ctx.wrap_error(io::Error::other("failed"), "making foo", kv!("detail1", 1));

        assert_eq!(error.to_string(), "making foo: failed");
        assert_eq!(keys(&error.tuples()), vec!["detail1", "ctx"]);
    }
}
