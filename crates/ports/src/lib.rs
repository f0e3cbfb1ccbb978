//! # ctxlog-ports
//!
//! Contracts between application code and logging backends.
//!
//! This crate defines the level type, the explicit request-scoped
//! `LogContext`, the `LogSink` output contract, and the `ContextLogger`
//! trait. It depends only on `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod context;
pub mod level;
pub mod logger;
pub mod sink;

pub use context::*;
pub use level::*;
pub use logger::*;
pub use sink::*;

// Re-export the value model used in port signatures, so adapter crates can
// implement ports without directly depending on `ctxlog-shared`.
pub use ctxlog_shared::{ErrorEnvelope, LogValue, StructuredError, kv};
