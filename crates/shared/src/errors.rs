//! Error envelope types and helpers.
//!
//! `ErrorEnvelope` is the workspace error type and also the structured error
//! that log records know how to expand: its metadata is an ordered key/value
//! sequence that ends up as extra fields next to the rendered message.

use crate::value::{LogValue, StructuredError};
use std::error::Error as StdError;
use std::sync::Arc;
use std::{fmt, io};

/// High-level classification of error origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected failures (validation, user input, configuration).
    Expected,
    /// Invariant violations.
    Invariant,
    /// Unexpected failures (I/O, external dependencies).
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => formatter.write_str("expected"),
            Self::Invariant => formatter.write_str("invariant"),
            Self::Unexpected => formatter.write_str("unexpected"),
        }
    }
}

/// Stable error code with namespace and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a new error code with a namespace and code.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// Invalid input code.
    pub fn invalid_input() -> Self {
        Self::new("core", "invalid_input")
    }

    /// Not found code.
    pub fn not_found() -> Self {
        Self::new("core", "not_found")
    }

    /// Permission denied code.
    pub fn permission_denied() -> Self {
        Self::new("core", "permission_denied")
    }

    /// I/O error code.
    pub fn io() -> Self {
        Self::new("core", "io")
    }

    /// Internal failure code.
    pub fn internal() -> Self {
        Self::new("core", "internal")
    }

    /// Wrapped failure code, used when an error is annotated with context.
    pub fn wrapped() -> Self {
        Self::new("core", "wrapped")
    }

    /// Returns the namespace portion.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the code identifier.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Structured error envelope shared across crates.
///
/// Display renders `message`, followed by `": {source}"` when a source is
/// attached, so wrapping reads like `making foo: failed`.
#[derive(Debug, Clone)]
pub struct ErrorEnvelope {
    /// Error kind describing the origin category.
    pub kind: ErrorKind,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Ordered diagnostic key/value detail (flat: key, value, key, value...).
    pub metadata: Vec<LogValue>,
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl ErrorEnvelope {
    /// Create an expected error.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Expected, code, message)
    }

    /// Create an invariant error.
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Invariant, code, message)
    }

    /// Create an unexpected error.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Unexpected, code, message)
    }

    fn with_kind(kind: ErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            metadata: Vec::new(),
            source: None,
        }
    }

    /// Annotate `source` with a message and key/value detail.
    ///
    /// The result displays as `"{message}: {source}"` and exposes `kv` as
    /// structured tuples.
    pub fn wrap<E>(
        source: E,
        message: impl Into<String>,
        kv: impl IntoIterator<Item = LogValue>,
    ) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let mut envelope = Self::unexpected(ErrorCode::wrapped(), message).with_source(source);
        envelope.metadata.extend(kv);
        envelope
    }

    /// Attach a source error.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<LogValue>) -> Self {
        self.metadata.push(LogValue::from(key.into()));
        self.metadata.push(value.into());
        self
    }

    /// Look up the first metadata value recorded under `key`.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&LogValue> {
        self.metadata
            .chunks_exact(2)
            .find(|pair| pair.first().and_then(LogValue::as_key) == Some(key))
            .and_then(|pair| pair.get(1))
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(formatter, "{}: {source}", self.message),
            None => formatter.write_str(&self.message),
        }
    }
}

impl StdError for ErrorEnvelope {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| -> &(dyn StdError + 'static) { source })
    }
}

impl StructuredError for ErrorEnvelope {
    fn tuples(&self) -> Vec<LogValue> {
        self.metadata.clone()
    }
}

impl From<io::Error> for ErrorEnvelope {
    fn from(error: io::Error) -> Self {
        let code = error_code_from_io_kind(error.kind());
        Self::unexpected(code, "i/o failure").with_source(error)
    }
}

fn error_code_from_io_kind(kind: io::ErrorKind) -> ErrorCode {
    match kind {
        io::ErrorKind::NotFound => ErrorCode::not_found(),
        io::ErrorKind::PermissionDenied => ErrorCode::permission_denied(),
        _ => ErrorCode::io(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_constructors() {
        let expected = ErrorEnvelope::expected(ErrorCode::invalid_input(), "invalid");
        assert_eq!(expected.kind, ErrorKind::Expected);
        assert_eq!(expected.code, ErrorCode::invalid_input());

        let invariant = ErrorEnvelope::invariant(ErrorCode::internal(), "boom");
        assert_eq!(invariant.kind, ErrorKind::Invariant);

        let unexpected = ErrorEnvelope::unexpected(ErrorCode::io(), "io");
        assert_eq!(unexpected.kind, ErrorKind::Unexpected);
        assert_eq!(unexpected.to_string(), "io");
    }

    #[test]
    fn wrap_renders_message_and_source() {
        let wrapped = ErrorEnvelope::wrap(
            io::Error::other("failed"),
            "making foo",
            [LogValue::from("detail1"), LogValue::from(1)],
        );

        assert_eq!(wrapped.to_string(), "making foo: failed");
        assert!(wrapped.source().is_some());
        assert_eq!(wrapped.tuples().len(), 2);
        assert!(matches!(
            wrapped.metadata_value("detail1"),
            Some(LogValue::I64(1))
        ));
    }

    #[test]
    fn metadata_keeps_insertion_order() {
        let error = ErrorEnvelope::expected(ErrorCode::invalid_input(), "bad")
            .with_metadata("zeta", 1)
            .with_metadata("alpha", 2);

        let keys: Vec<&str> = error
            .metadata
            .iter()
            .step_by(2)
            .filter_map(LogValue::as_key)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn io_errors_map_to_codes() {
        let envelope = ErrorEnvelope::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(envelope.code, ErrorCode::not_found());
        assert_eq!(envelope.kind, ErrorKind::Unexpected);
    }
}
