//! Encoder + sink + level gate.
//!
//! A `Pipeline` is the backend a `Logger` routes records into. It can also be
//! used directly: its log methods apply the level gate and write the given
//! key/value sequence as-is, with no context fields and no error expansion.

use crate::caller::{self, Caller};
use crate::encoder::{Encoder, Entry, Field};
use crate::level_gate::LevelEnabler;
use chrono::Utc;
use ctxlog_ports::{LogLevel, LogSink, LogValue};
use ctxlog_shared::BAD_KEY;
use std::fmt;
use std::io;
use std::panic::Location;
use std::sync::Arc;

/// Extra pipeline behaviour applied at construction.
#[derive(Debug, Clone)]
pub enum PipelineOption {
    /// Static key/value fields written after the message, before record fields.
    Fields(Vec<LogValue>),
    /// Annotate records with the call site.
    AddCaller(bool),
    /// Report a caller this many frames further up the stack.
    CallerSkip(usize),
}

impl PipelineOption {
    /// Static fields from a flat key/value list.
    pub fn fields<I>(kv: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        Self::Fields(kv.into_iter().map(Into::into).collect())
    }
}

/// Structured-log backend: encoder, sink, level gate, and options.
#[derive(Clone)]
pub struct Pipeline {
    encoder: Arc<dyn Encoder>,
    sink: Arc<dyn LogSink>,
    gate: Arc<dyn LevelEnabler>,
    fields: Arc<[LogValue]>,
    add_caller: bool,
    caller_skip: usize,
}

impl Pipeline {
    /// Pipeline without options.
    pub fn new(
        encoder: Arc<dyn Encoder>,
        sink: Arc<dyn LogSink>,
        gate: Arc<dyn LevelEnabler>,
    ) -> Self {
        Self {
            encoder,
            sink,
            gate,
            fields: Arc::default(),
            add_caller: false,
            caller_skip: 0,
        }
    }

    /// Copy of this pipeline with `options` applied in order.
    #[must_use]
    pub fn with_options(&self, options: &[PipelineOption]) -> Self {
        let mut next = self.clone();
        for option in options {
            match option {
                PipelineOption::Fields(kv) => {
                    next.fields = next.fields.iter().chain(kv.iter()).cloned().collect();
                },
                PipelineOption::AddCaller(enabled) => next.add_caller = *enabled,
                PipelineOption::CallerSkip(skip) => {
                    next.caller_skip = next.caller_skip.saturating_add(*skip);
                },
            }
        }
        next
    }

    /// Whether the gate accepts `level`.
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.gate.enabled(level)
    }

    /// Encoder.
    pub fn encoder(&self) -> &Arc<dyn Encoder> {
        &self.encoder
    }

    /// Output sink.
    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Level gate.
    pub fn gate(&self) -> &Arc<dyn LevelEnabler> {
        &self.gate
    }

    /// Static fields.
    pub fn static_fields(&self) -> &[LogValue] {
        &self.fields
    }

    /// Whether records carry the call site.
    pub const fn adds_caller(&self) -> bool {
        self.add_caller
    }

    /// Extra frames skipped when reporting the call site.
    pub const fn caller_skip(&self) -> usize {
        self.caller_skip
    }

    /// Flush the sink.
    pub fn flush(&self) -> io::Result<()> {
        self.sink.flush()
    }

    /// Write a record at `level` if the gate accepts it.
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str, kv: &[LogValue]) {
        if self.gate.enabled(level) {
            self.emit(level, Location::caller(), message, kv);
        }
    }

    /// Write a debug record.
    #[track_caller]
    pub fn debug(&self, message: &str, kv: &[LogValue]) {
        self.log(LogLevel::Debug, message, kv);
    }

    /// Write an info record.
    #[track_caller]
    pub fn info(&self, message: &str, kv: &[LogValue]) {
        self.log(LogLevel::Info, message, kv);
    }

    /// Write a warn record.
    #[track_caller]
    pub fn warn(&self, message: &str, kv: &[LogValue]) {
        self.log(LogLevel::Warn, message, kv);
    }

    /// Write an error record.
    #[track_caller]
    pub fn error(&self, message: &str, kv: &[LogValue]) {
        self.log(LogLevel::Error, message, kv);
    }

    pub(crate) fn skip_one_more(&self) -> Self {
        Self {
            caller_skip: self.caller_skip.saturating_add(1),
            ..self.clone()
        }
    }

    /// Encode and write without consulting the gate.
    pub(crate) fn emit(
        &self,
        level: LogLevel,
        location: &Location<'_>,
        message: &str,
        kv: &[LogValue],
    ) {
        let caller: Option<Caller> = self
            .add_caller
            .then(|| caller::resolve(location, self.caller_skip));

        let mut fields = Vec::with_capacity((self.fields.len() + kv.len()) / 2 + 1);
        collect_fields(&self.fields, &mut fields);
        collect_fields(kv, &mut fields);

        let entry = Entry {
            level,
            time: Utc::now(),
            caller: caller.as_ref(),
            message,
            fields: &fields,
        };

        let mut buf = Vec::with_capacity(256);
        if let Err(error) = self.encoder.encode(&entry, &mut buf) {
            tracing::warn!(target: "ctxlog::sink", %error, "failed to encode log record");
            return;
        }
        if let Err(error) = self.sink.write_line(&buf) {
            tracing::warn!(target: "ctxlog::sink", %error, "failed to write log record");
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Pipeline")
            .field("fields", &self.fields)
            .field("add_caller", &self.add_caller)
            .field("caller_skip", &self.caller_skip)
            .finish_non_exhaustive()
    }
}

/// Pair up a flat key/value sequence.
///
/// Anything that cannot start a `(string key, value)` pair, including a
/// trailing key, is written under [`BAD_KEY`].
fn collect_fields<'a>(kv: &'a [LogValue], out: &mut Vec<Field<'a>>) {
    let mut rest = kv;
    while let Some((item, tail)) = rest.split_first() {
        match (item.as_key(), tail.split_first()) {
            (Some(key), Some((value, after))) => {
                out.push(Field::new(key, value));
                rest = after;
            },
            _ => {
                out.push(Field::new(BAD_KEY, item));
                rest = tail;
            },
        }
    }
}
