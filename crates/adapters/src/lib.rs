//! # ctxlog-adapters
//!
//! Logging backend and the context-aware `Logger`.
//!
//! - `level_gate`: fixed and atomic level gates
//! - `encoder`: JSON and console record encoders
//! - `log_sink`: stream, writer, and in-memory sinks
//! - `pipeline`: encoder + sink + gate, with options
//! - `logger`: routing, field merging, and error expansion
//!
//! This crate depends on `ports`, `shared`, and `config`.

pub mod caller;
pub mod encoder;
pub mod level_gate;
pub mod log_sink;
pub mod logger;
pub mod pipeline;
mod record;

pub use caller::Caller;
pub use encoder::{ConsoleEncoder, Encoder, Entry, Field, JsonEncoder, STRIPPED_TIME};
pub use level_gate::{AtomicLevel, LevelEnabler};
pub use log_sink::{BufferSink, DiscardSink, StderrSink, StdoutSink, WriterSink, stream_sink};
pub use logger::{Logger, LoggerConfig};
pub use pipeline::{Pipeline, PipelineOption};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
