//! # ctxlog-shared
//!
//! Shared value model, result types, and error handling for the ctxlog workspace.
//!
//! This crate provides foundational types that are used across all other crates:
//!
//! - `LogValue`, the tagged union carried by every key/value pair
//! - `ErrorEnvelope`, the workspace error type and the structured error that
//!   log records expand into extra fields
//! - explicit validation of flat key/value sequences
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Capabilities over inheritance** - structured errors are discovered
//!    through the `StructuredError` trait and the `source()` chain

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod result;
pub mod value;

pub use errors::{ErrorCode, ErrorEnvelope, ErrorKind};
pub use result::Result;
pub use value::{
    BAD_KEY, DeferredValue, ErrorValue, LogValue, PairError, StructuredError, validate_pairs,
};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::errors::{ErrorCode, ErrorEnvelope, ErrorKind};
    use super::result::Result;
    use super::value::{LogValue, validate_pairs};
    use proptest::prelude::*;

    #[test]
    fn shared_error_types_are_available() {
        let error = ErrorEnvelope::expected(ErrorCode::invalid_input(), "invalid");
        assert_eq!(error.kind, ErrorKind::Expected);
    }

    #[test]
    fn shared_result_type_is_available() {
        let value: Result<i32> = Ok(5);
        assert!(matches!(value.map(|value| value + 1), Ok(6)));
    }

    proptest! {
        #[test]
        fn even_string_keyed_sequences_validate(keys in proptest::collection::vec("[a-z]{1,8}", 0..16)) {
            let kv: Vec<LogValue> = keys
                .iter()
                .enumerate()
                .flat_map(|(index, key)| [LogValue::from(key.as_str()), LogValue::from(index)])
                .collect();
            prop_assert!(validate_pairs(&kv).is_ok());
        }

        #[test]
        fn appending_a_dangling_key_is_rejected(keys in proptest::collection::vec("[a-z]{1,8}", 0..16)) {
            let mut kv: Vec<LogValue> = keys
                .iter()
                .flat_map(|key| [LogValue::from(key.as_str()), LogValue::from(true)])
                .collect();
            kv.push(LogValue::from("dangling"));
            prop_assert!(validate_pairs(&kv).is_err());
        }
    }
}
