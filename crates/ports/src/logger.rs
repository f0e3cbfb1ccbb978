//! Contextual logging boundary contract.

use crate::context::LogContext;
use ctxlog_shared::LogValue;

/// Boundary contract for context-aware structured logging.
///
/// `kv` is a flat key/value sequence (see [`ctxlog_shared::kv!`]). Context
/// fields are appended after it. Implementations never fail the caller: write
/// errors and malformed pairs are handled internally.
pub trait ContextLogger: Send + Sync {
    /// Debug event.
    #[track_caller]
    fn debug(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]);

    /// Info event.
    #[track_caller]
    fn info(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]);

    /// Info event that is written regardless of the configured level.
    #[track_caller]
    fn important(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]);

    /// Warn event.
    #[track_caller]
    fn warn(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]);

    /// Error event.
    #[track_caller]
    fn error(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]);
}

/// Something that can hand out a contextual logger.
pub trait LoggerProvider {
    /// Borrow the contextual logger.
    fn ctx_logger(&self) -> &dyn ContextLogger;
}

/// Logger that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl ContextLogger for NoOpLogger {
    fn debug(&self, _ctx: &LogContext, _msg: &str, _kv: &[LogValue]) {}

    fn info(&self, _ctx: &LogContext, _msg: &str, _kv: &[LogValue]) {}

    fn important(&self, _ctx: &LogContext, _msg: &str, _kv: &[LogValue]) {}

    fn warn(&self, _ctx: &LogContext, _msg: &str, _kv: &[LogValue]) {}

    fn error(&self, _ctx: &LogContext, _msg: &str, _kv: &[LogValue]) {}
}

impl LoggerProvider for NoOpLogger {
    fn ctx_logger(&self) -> &dyn ContextLogger {
        self
    }
}
