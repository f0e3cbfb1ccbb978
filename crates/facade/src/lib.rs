//! # ctxlog
//!
//! Context-aware structured logging.
//! This crate re-exports the public surface of `adapters`, `config`, `ports`,
//! and `shared`, and adds one-call constructors.
//!
//! ```no_run
//! use ctxlog::{LogContext, LoggerConfig, kv, new_logger};
//!
//! let logger = new_logger(LoggerConfig::default());
//! let ctx = LogContext::new().with_fields(kv!("request_id", "r-1"));
//! logger.info(&ctx, "request accepted", &kv!("path", "/health"));
//! ```

pub use ctxlog_adapters::{
    AtomicLevel, BufferSink, Caller, ConsoleEncoder, DiscardSink, Encoder, Entry, Field,
    JsonEncoder, LevelEnabler, Logger, LoggerConfig, Pipeline, PipelineOption, STRIPPED_TIME,
    StderrSink, StdoutSink, WriterSink, stream_sink,
};
pub use ctxlog_config::{
    ENV_COLORED_OUTPUT, ENV_DEV_MODE, ENV_FIELD_NAMES_MESSAGE, ENV_FIELD_NAMES_TIMESTAMP,
    ENV_LEVEL, ENV_OUTPUT, ENV_STRIP_TIME, EnvParseError, FieldNames, LogConfig, LogEnv,
    OutputTarget, load_log_config_from_path, load_log_config_from_sources,
    load_log_config_std_env, to_pretty_json, to_pretty_toml,
};
pub use ctxlog_ports::{
    ContextLogger, LogContext, LogLevel, LogSink, LoggerProvider, NoOpLogger,
};
pub use ctxlog_shared::{
    ErrorCode, ErrorEnvelope, ErrorKind, LogValue, PairError, Result, StructuredError, kv,
    validate_pairs,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build a logger from explicit configuration, without extra options.
pub fn new_logger(config: LoggerConfig) -> Logger {
    Logger::new(config, [])
}

/// Build a logger from an optional config file plus `CTXLOG_*` variables
/// from the process environment.
pub fn logger_from_env(config_path: Option<&Path>) -> Result<Logger> {
    let settings = load_log_config_std_env(config_path)?;
    Ok(logger_from_settings(settings))
}

/// Build a logger from an optional config file plus the given env map.
pub fn logger_from_env_map(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> Result<Logger> {
    let env = LogEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    let settings = load_log_config_from_path(config_path, &env)?;
    Ok(logger_from_settings(settings))
}

fn logger_from_settings(settings: LogConfig) -> Logger {
    tracing::debug!(
        target: "ctxlog",
        level = ?settings.level,
        dev_mode = settings.dev_mode,
        output = %settings.output,
        "building logger"
    );
    Logger::new(LoggerConfig::from(settings), [])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxlog_adapters::adapters_crate_version;
    use ctxlog_config::config_crate_version;
    use std::error::Error;
    use std::sync::Arc;

    #[test]
    fn facade_crate_compiles() {
        let version = facade_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn facade_can_use_adapters_and_config() {
        assert!(!adapters_crate_version().is_empty());
        assert!(!config_crate_version().is_empty());
    }

    #[test]
    fn new_logger_writes_through_the_configured_sink() {
        let sink = BufferSink::new();
        let logger = new_logger(
            LoggerConfig::default()
                .with_strip_time(true)
                .with_output(Arc::new(sink.clone())),
        );

        logger.info(&LogContext::new(), "ready", &kv!("port", 8080));

        assert_eq!(
            sink.lines(),
            vec!["{\"level\":\"info\",\"time\":\"<stripped>\",\"msg\":\"ready\",\"port\":8080}"]
        );
    }

    #[test]
    fn env_map_without_level_uses_loader_default() -> std::result::Result<(), Box<dyn Error>> {
        let logger = logger_from_env_map(&BTreeMap::new(), None)?;
        assert_eq!(logger.level(), Some(LogLevel::Error));
        Ok(())
    }

    #[test]
    fn env_map_level_override_applies() -> std::result::Result<(), Box<dyn Error>> {
        let env = BTreeMap::from([("CTXLOG_LEVEL".to_owned(), "debug".to_owned())]);
        let logger = logger_from_env_map(&env, None)?;
        assert_eq!(logger.level(), Some(LogLevel::Debug));
        Ok(())
    }

    #[test]
    fn invalid_env_value_is_reported() {
        let env = BTreeMap::from([("CTXLOG_DEV_MODE".to_owned(), "maybe".to_owned())]);
        let error = logger_from_env_map(&env, None).err();
        assert_eq!(
            error.map(|error| error.code.to_string()),
            Some("config:invalid_env_bool".to_owned())
        );
    }

    #[test]
    fn missing_config_file_is_reported() {
        let result = logger_from_env_map(
            &BTreeMap::new(),
            Some(Path::new("definitely/not/here/logger.toml")),
        );
        assert!(result.is_err());
    }
}
