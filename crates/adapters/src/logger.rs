//! Context-aware logger.
//!
//! Each call resolves a pipeline from the context and the current threshold,
//! merges call arguments with context fields, expands error values, and emits
//! one record:
//!
//! 1. A force-debug context selects the debug pipeline; otherwise the normal
//!    pipeline is used when the threshold enables the level, and the call is
//!    a no-op when it does not.
//! 2. A context sink gets a bare per-call pipeline (the logger's encoder, no
//!    static fields, no caller annotation), gated at `debug` when forced and
//!    at the threshold otherwise.
//! 3. Call arguments come first, context fields second.

use crate::encoder::{ConsoleEncoder, Encoder, JsonEncoder};
use crate::level_gate::{AtomicLevel, LevelEnabler};
use crate::log_sink::stream_sink;
use crate::pipeline::{Pipeline, PipelineOption};
use crate::record;
use ctxlog_config::LogConfig;
use ctxlog_ports::{ContextLogger, LogContext, LogLevel, LogSink, LogValue, LoggerProvider};
use ctxlog_shared::validate_pairs;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, PoisonError, RwLock};

/// Runtime logger configuration.
#[derive(Clone, Default)]
pub struct LoggerConfig {
    /// Declarative settings.
    pub settings: LogConfig,
    /// Destination; `None` writes to the stream named in `settings.output`.
    pub output: Option<Arc<dyn LogSink>>,
    /// Extra pipeline options, applied before constructor options.
    pub options: Vec<PipelineOption>,
}

impl LoggerConfig {
    /// Config from declarative settings.
    #[must_use]
    pub fn new(settings: LogConfig) -> Self {
        Self {
            settings,
            output: None,
            options: Vec::new(),
        }
    }

    /// Set the starting level.
    #[must_use]
    pub const fn with_level(mut self, level: LogLevel) -> Self {
        self.settings.level = Some(level);
        self
    }

    /// Toggle dev (console) mode.
    #[must_use]
    pub const fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.settings.dev_mode = dev_mode;
        self
    }

    /// Toggle time stripping.
    #[must_use]
    pub const fn with_strip_time(mut self, strip_time: bool) -> Self {
        self.settings.strip_time = strip_time;
        self
    }

    /// Toggle level colouring in dev mode.
    #[must_use]
    pub const fn with_colored_output(mut self, colored: bool) -> Self {
        self.settings.colored_output = colored;
        self
    }

    /// Write records to `sink`.
    #[must_use]
    pub fn with_output(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.output = Some(sink);
        self
    }

    /// Append pipeline options.
    #[must_use]
    pub fn with_options(mut self, options: impl IntoIterator<Item = PipelineOption>) -> Self {
        self.options.extend(options);
        self
    }
}

impl From<LogConfig> for LoggerConfig {
    fn from(settings: LogConfig) -> Self {
        Self::new(settings)
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoggerConfig")
            .field("settings", &self.settings)
            .field("output", &self.output.is_some())
            .field("options", &self.options)
            .finish()
    }
}

/// Settable threshold shared by a logger, its views, and its normal pipeline.
///
/// A custom enabler, when installed, takes precedence over the level.
#[derive(Clone)]
struct SharedThreshold {
    level: AtomicLevel,
    custom: Arc<RwLock<Option<Arc<dyn LevelEnabler>>>>,
}

impl SharedThreshold {
    fn new(level: LogLevel) -> Self {
        Self {
            level: AtomicLevel::new(level),
            custom: Arc::default(),
        }
    }

    fn custom(&self) -> Option<Arc<dyn LevelEnabler>> {
        self.custom
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_custom(&self, enabler: Option<Arc<dyn LevelEnabler>>) {
        *self.custom.write().unwrap_or_else(PoisonError::into_inner) = enabler;
    }
}

impl LevelEnabler for SharedThreshold {
    fn enabled(&self, level: LogLevel) -> bool {
        self.custom()
            .map_or_else(|| self.level.enabled(level), |custom| custom.enabled(level))
    }
}

#[derive(Clone)]
enum Threshold {
    Settable(SharedThreshold),
    Wrapped(Arc<dyn LevelEnabler>),
}

impl Threshold {
    fn snapshot(&self) -> Snapshot {
        match self {
            Self::Settable(shared) => shared
                .custom()
                .map_or_else(|| Snapshot::Level(shared.level.level()), Snapshot::Enabler),
            Self::Wrapped(enabler) => Snapshot::Enabler(Arc::clone(enabler)),
        }
    }
}

/// Threshold as read once at the start of a call.
enum Snapshot {
    Level(LogLevel),
    Enabler(Arc<dyn LevelEnabler>),
}

impl Snapshot {
    fn enabled(&self, level: LogLevel) -> bool {
        match self {
            Self::Level(threshold) => threshold.enabled(level),
            Self::Enabler(enabler) => enabler.enabled(level),
        }
    }

    fn gate(&self) -> Arc<dyn LevelEnabler> {
        match self {
            Self::Level(threshold) => Arc::new(*threshold),
            Self::Enabler(enabler) => Arc::clone(enabler),
        }
    }
}

/// Context-aware structured logger.
///
/// Cheap to clone; clones and `skip_caller` views share the threshold.
#[derive(Clone)]
pub struct Logger {
    threshold: Threshold,
    dev_caller: bool,
    encoder: Arc<dyn Encoder>,
    normal: Pipeline,
    debug: Pipeline,
}

impl Logger {
    /// Build a logger; `options` are applied after `config.options`.
    pub fn new(config: LoggerConfig, options: impl IntoIterator<Item = PipelineOption>) -> Self {
        let LoggerConfig {
            settings,
            output,
            options: mut all_options,
        } = config;
        let settings = settings.normalize();
        all_options.extend(options);

        let sink = output.unwrap_or_else(|| stream_sink(settings.output));
        let encoder: Arc<dyn Encoder> = if settings.dev_mode {
            Arc::new(
                ConsoleEncoder::new()
                    .with_strip_time(settings.strip_time)
                    .with_color(settings.colored_output),
            )
        } else {
            Arc::new(
                JsonEncoder::new()
                    .with_message_key(settings.field_names.message_key())
                    .with_time_key(settings.field_names.timestamp_key())
                    .with_strip_time(settings.strip_time),
            )
        };
        if settings.dev_mode {
            all_options.push(PipelineOption::AddCaller(true));
        }

        let threshold = SharedThreshold::new(settings.effective_level());
        let normal = Pipeline::new(
            Arc::clone(&encoder),
            Arc::clone(&sink),
            Arc::new(threshold.clone()),
        )
        .with_options(&all_options);
        let debug = Pipeline::new(Arc::clone(&encoder), sink, Arc::new(LogLevel::Debug))
            .with_options(&all_options);

        Self {
            threshold: Threshold::Settable(threshold),
            dev_caller: settings.dev_mode,
            encoder,
            normal,
            debug,
        }
    }

    /// Build a logger around pre-built pipelines.
    ///
    /// The threshold is the normal pipeline's own gate; `set_level` panics on
    /// the result. `encoder` is used for per-call pipelines targeting a context
    /// sink.
    pub fn wrap(
        normal: &Pipeline,
        debug: &Pipeline,
        encoder: Arc<dyn Encoder>,
        options: &[PipelineOption],
    ) -> Self {
        let normal = normal.with_options(options);
        let debug = debug.with_options(options);
        Self {
            threshold: Threshold::Wrapped(Arc::clone(normal.gate())),
            dev_caller: false,
            encoder,
            normal,
            debug,
        }
    }

    /// Replace the threshold with a fixed level, dropping any enabler set
    /// with [`Logger::set_level_enabler`]. Visible to every clone on its next
    /// call.
    ///
    /// # Panics
    ///
    /// Panics when the logger was built with [`Logger::wrap`].
    #[allow(
        clippy::panic,
        reason = "changing the level of a wrapped pipeline is a programming error"
    )]
    pub fn set_level(&self, level: LogLevel) {
        match &self.threshold {
            Threshold::Settable(shared) => {
                shared.level.set_level(level);
                shared.replace_custom(None);
            },
            Threshold::Wrapped(_) => {
                panic!("cannot set level when logger is created with wrapped pipelines")
            },
        }
    }

    /// Replace the threshold with an arbitrary enabler. While it is installed
    /// the [`AtomicLevel`] handle is ignored.
    ///
    /// # Panics
    ///
    /// Panics when the logger was built with [`Logger::wrap`].
    #[allow(
        clippy::panic,
        reason = "changing the level of a wrapped pipeline is a programming error"
    )]
    pub fn set_level_enabler(&self, enabler: Arc<dyn LevelEnabler>) {
        match &self.threshold {
            Threshold::Settable(shared) => shared.replace_custom(Some(enabler)),
            Threshold::Wrapped(_) => {
                panic!("cannot set level enabler when logger is created with wrapped pipelines")
            },
        }
    }

    /// Current threshold level. `None` when the logger wraps external
    /// pipelines or a custom enabler is installed.
    #[must_use]
    pub fn level(&self) -> Option<LogLevel> {
        match &self.threshold {
            Threshold::Settable(shared) if shared.custom().is_none() => {
                Some(shared.level.level())
            },
            Threshold::Settable(_) | Threshold::Wrapped(_) => None,
        }
    }

    /// Shared level handle, unless the logger wraps external pipelines.
    #[must_use]
    pub const fn atomic_level(&self) -> Option<&AtomicLevel> {
        match &self.threshold {
            Threshold::Settable(shared) => Some(&shared.level),
            Threshold::Wrapped(_) => None,
        }
    }

    /// View that reports the caller one frame further up, for use from
    /// logging helpers. Only dev mode reports callers; elsewhere this is a
    /// plain clone.
    #[must_use]
    pub fn skip_caller(&self) -> Self {
        if !self.dev_caller {
            return self.clone();
        }
        Self {
            normal: self.normal.skip_one_more(),
            debug: self.debug.skip_one_more(),
            ..self.clone()
        }
    }

    /// Normal pipeline, for direct use without context handling.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.normal
    }

    /// Debug pipeline.
    #[must_use]
    pub const fn debug_pipeline(&self) -> &Pipeline {
        &self.debug
    }

    /// Log at debug.
    #[track_caller]
    pub fn debug(&self, ctx: &LogContext, message: &str, kv: &[LogValue]) {
        self.route(ctx, LogLevel::Debug, false, Location::caller(), message, kv);
    }

    /// Log at info.
    #[track_caller]
    pub fn info(&self, ctx: &LogContext, message: &str, kv: &[LogValue]) {
        self.route(ctx, LogLevel::Info, false, Location::caller(), message, kv);
    }

    /// Log at info regardless of the threshold.
    #[track_caller]
    pub fn important(&self, ctx: &LogContext, message: &str, kv: &[LogValue]) {
        self.route(ctx, LogLevel::Info, true, Location::caller(), message, kv);
    }

    /// Log at warn.
    #[track_caller]
    pub fn warn(&self, ctx: &LogContext, message: &str, kv: &[LogValue]) {
        self.route(ctx, LogLevel::Warn, false, Location::caller(), message, kv);
    }

    /// Log at error.
    #[track_caller]
    pub fn error(&self, ctx: &LogContext, message: &str, kv: &[LogValue]) {
        self.route(ctx, LogLevel::Error, false, Location::caller(), message, kv);
    }

    fn route(
        &self,
        ctx: &LogContext,
        level: LogLevel,
        force: bool,
        location: &Location<'_>,
        message: &str,
        kv: &[LogValue],
    ) {
        let snapshot = self.threshold.snapshot();
        let forced = force || ctx.is_force_debug();

        let selected = if forced {
            &self.debug
        } else if snapshot.enabled(level) {
            &self.normal
        } else {
            return;
        };

        let pipeline = match ctx.sink() {
            Some(sink) => {
                let gate: Arc<dyn LevelEnabler> = if forced {
                    Arc::new(LogLevel::Debug)
                } else {
                    snapshot.gate()
                };
                Cow::Owned(Pipeline::new(Arc::clone(&self.encoder), Arc::clone(sink), gate))
            },
            None => Cow::Borrowed(selected),
        };

        if let Err(error) = validate_pairs(kv) {
            tracing::debug!(target: "ctxlog", %error, message, "malformed key/value arguments");
        }

        let fields = record::assemble(kv, ctx.fields());
        pipeline.emit(level, location, message, &fields);
    }
}

impl ContextLogger for Logger {
    #[track_caller]
    fn debug(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]) {
        Self::debug(self, ctx, msg, kv);
    }

    #[track_caller]
    fn info(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]) {
        Self::info(self, ctx, msg, kv);
    }

    #[track_caller]
    fn important(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]) {
        Self::important(self, ctx, msg, kv);
    }

    #[track_caller]
    fn warn(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]) {
        Self::warn(self, ctx, msg, kv);
    }

    #[track_caller]
    fn error(&self, ctx: &LogContext, msg: &str, kv: &[LogValue]) {
        Self::error(self, ctx, msg, kv);
    }
}

impl LoggerProvider for Logger {
    fn ctx_logger(&self) -> &dyn ContextLogger {
        self
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Logger")
            .field("level", &self.level())
            .field("dev_caller", &self.dev_caller)
            .field("normal", &self.normal)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
