//! Loggable values and key/value pair handling.
//!
//! Log calls carry a flat, ordered sequence of `LogValue`s where even offsets
//! are keys and odd offsets are values. The sequence mirrors variadic
//! key/value arguments: it is cheap to build with [`kv!`](crate::kv) and is
//! validated explicitly with [`validate_pairs`] before it is merged.

use serde::ser::{Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::errors::ErrorEnvelope;

/// Placeholder key used for items that cannot form a `(string key, value)` pair.
pub const BAD_KEY: &str = "!BADKEY";

/// A single loggable value.
#[derive(Clone, Default)]
pub enum LogValue {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    I64(i64),
    /// Unsigned integer.
    U64(u64),
    /// Floating point number.
    F64(f64),
    /// String. Keys are always strings.
    Str(Box<str>),
    /// Arbitrary JSON payload.
    Json(serde_json::Value),
    /// Error value; expanded into its message (and tuples) before encoding.
    Error(ErrorValue),
    /// Value produced lazily at encode time.
    Deferred(DeferredValue),
}

impl LogValue {
    /// Wrap any error. Structured detail is discovered from the source chain,
    /// which only recognizes [`ErrorEnvelope`]. Other [`StructuredError`]
    /// types contribute tuples only when passed to
    /// [`LogValue::structured_error`] directly.
    pub fn error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Error(ErrorValue::new(error))
    }

    /// Wrap an error that exposes structured key/value tuples.
    pub fn structured_error<E>(error: E) -> Self
    where
        E: StructuredError + 'static,
    {
        Self::Error(ErrorValue::structured(error))
    }

    /// Wrap a closure evaluated only when the record is encoded.
    pub fn deferred<F>(produce: F) -> Self
    where
        F: Fn() -> serde_json::Value + Send + Sync + 'static,
    {
        Self::Deferred(DeferredValue::new(produce))
    }

    /// Borrow the value as a key, when it is a string.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the error payload, when the value is an error.
    #[must_use]
    pub const fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Debug for LogValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => formatter.write_str("Null"),
            Self::Bool(value) => formatter.debug_tuple("Bool").field(value).finish(),
            Self::I64(value) => formatter.debug_tuple("I64").field(value).finish(),
            Self::U64(value) => formatter.debug_tuple("U64").field(value).finish(),
            Self::F64(value) => formatter.debug_tuple("F64").field(value).finish(),
            Self::Str(value) => formatter.debug_tuple("Str").field(value).finish(),
            Self::Json(value) => formatter.debug_tuple("Json").field(value).finish(),
            Self::Error(value) => formatter.debug_tuple("Error").field(value).finish(),
            Self::Deferred(_) => formatter.write_str("Deferred(..)"),
        }
    }
}

impl Serialize for LogValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::I64(value) => serializer.serialize_i64(*value),
            Self::U64(value) => serializer.serialize_u64(*value),
            Self::F64(value) => serializer.serialize_f64(*value),
            Self::Str(value) => serializer.serialize_str(value),
            Self::Json(value) => value.serialize(serializer),
            Self::Error(error) => serializer.serialize_str(&error.message()),
            Self::Deferred(deferred) => deferred.produce().serialize(serializer),
        }
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),+) => {
        $(impl From<$ty> for LogValue {
            fn from(value: $ty) -> Self {
                Self::I64(i64::from(value))
            }
        })+
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),+) => {
        $(impl From<$ty> for LogValue {
            fn from(value: $ty) -> Self {
                Self::U64(u64::from(value))
            }
        })+
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<isize> for LogValue {
    fn from(value: isize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Str(value.to_string().into()), Self::I64)
    }
}

impl From<usize> for LogValue {
    fn from(value: usize) -> Self {
        u64::try_from(value).map_or_else(|_| Self::Str(value.to_string().into()), Self::U64)
    }
}

impl From<f32> for LogValue {
    fn from(value: f32) -> Self {
        Self::F64(f64::from(value))
    }
}

impl From<f64> for LogValue {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<bool> for LogValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for LogValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for LogValue {
    fn from(value: String) -> Self {
        Self::Str(value.into_boxed_str())
    }
}

impl From<&String> for LogValue {
    fn from(value: &String) -> Self {
        Self::Str(value.as_str().into())
    }
}

impl From<Box<str>> for LogValue {
    fn from(value: Box<str>) -> Self {
        Self::Str(value)
    }
}

impl From<serde_json::Value> for LogValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<ErrorEnvelope> for LogValue {
    fn from(error: ErrorEnvelope) -> Self {
        Self::structured_error(error)
    }
}

impl From<ErrorValue> for LogValue {
    fn from(error: ErrorValue) -> Self {
        Self::Error(error)
    }
}

impl From<DeferredValue> for LogValue {
    fn from(value: DeferredValue) -> Self {
        Self::Deferred(value)
    }
}

impl<T> From<Option<T>> for LogValue
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Error that exposes supplementary key/value detail next to its message.
///
/// `tuples` returns a flat sequence: even offsets are keys, odd offsets are
/// values. A trailing key without a value is ignored during expansion.
pub trait StructuredError: StdError + Send + Sync {
    /// Supplementary key/value detail, in insertion order.
    fn tuples(&self) -> Vec<LogValue>;
}

/// Shared handle to an error carried in a log record.
#[derive(Clone)]
pub struct ErrorValue {
    inner: Arc<dyn StdError + Send + Sync>,
    structured: Option<Arc<dyn StructuredError>>,
}

impl ErrorValue {
    /// Wrap a plain error.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
            structured: None,
        }
    }

    /// Wrap an error that is known to expose structured tuples.
    pub fn structured<E>(error: E) -> Self
    where
        E: StructuredError + 'static,
    {
        let shared = Arc::new(error);
        let inner: Arc<dyn StdError + Send + Sync> = Arc::<E>::clone(&shared);
        let structured: Arc<dyn StructuredError> = shared;
        Self {
            inner,
            structured: Some(structured),
        }
    }

    /// Rendered error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.inner.to_string()
    }

    /// Borrow the wrapped error.
    #[must_use]
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }

    /// Structured capability of this error, if any.
    ///
    /// Errors wrapped with [`ErrorValue::structured`] answer directly; plain
    /// errors are searched along their `source()` chain for an
    /// [`ErrorEnvelope`]. A custom [`StructuredError`] reached only through
    /// `source()` is not detected, since trait objects cannot be downcast to
    /// an arbitrary trait.
    #[must_use]
    pub fn as_structured(&self) -> Option<&dyn StructuredError> {
        if let Some(structured) = &self.structured {
            return Some(&**structured);
        }

        let root: &(dyn StdError + 'static) = self.as_error();
        let mut current = Some(root);
        while let Some(candidate) = current {
            if let Some(envelope) = candidate.downcast_ref::<ErrorEnvelope>() {
                return Some(envelope);
            }
            current = candidate.source();
        }

        None
    }
}

impl fmt::Debug for ErrorValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ErrorValue")
            .field("message", &self.message())
            .field("structured", &self.structured.is_some())
            .finish()
    }
}

/// Lazily evaluated JSON value.
#[derive(Clone)]
pub struct DeferredValue(Arc<dyn Fn() -> serde_json::Value + Send + Sync>);

impl DeferredValue {
    /// Wrap a producer closure.
    pub fn new<F>(produce: F) -> Self
    where
        F: Fn() -> serde_json::Value + Send + Sync + 'static,
    {
        Self(Arc::new(produce))
    }

    /// Evaluate the value.
    #[must_use]
    pub fn produce(&self) -> serde_json::Value {
        (self.0)()
    }
}

impl fmt::Debug for DeferredValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("DeferredValue(..)")
    }
}

/// Contract violations in a flat key/value sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairError {
    /// The sequence has a trailing key without a value.
    #[error("key/value sequence has odd length {len}")]
    OddLength {
        /// Length of the offending sequence.
        len: usize,
    },
    /// A key position holds something other than a string.
    #[error("key at offset {index} is not a string")]
    NonStringKey {
        /// Offset of the offending key.
        index: usize,
    },
}

/// Validate a flat key/value sequence.
///
/// Returns the first violation found; key positions are checked before the
/// length so the reported offset is always the earliest problem.
pub fn validate_pairs(kv: &[LogValue]) -> Result<(), PairError> {
    for (index, key) in kv.iter().enumerate().step_by(2) {
        if key.as_key().is_none() {
            return Err(PairError::NonStringKey { index });
        }
    }

    if kv.len() % 2 == 1 {
        return Err(PairError::OddLength { len: kv.len() });
    }

    Ok(())
}

/// Build an array of [`LogValue`]s from a flat list of keys and values.
///
/// ```
/// use ctxlog_shared::{LogValue, kv};
///
/// let pairs = kv!("user", "ada", "attempt", 3);
/// assert_eq!(pairs.len(), 4);
/// assert_eq!(pairs[0].as_key(), Some("user"));
/// ```
#[macro_export]
macro_rules! kv {
    () => {{
        let empty: [$crate::LogValue; 0] = [];
        empty
    }};
    ($($item:expr),+ $(,)?) => {
        [$($crate::LogValue::from($item)),+]
    };
}
