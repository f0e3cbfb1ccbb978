//! Emit command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{Severity, to_log_values};
use ctxlog::{LogContext, LogLevel, logger_from_env_map};
use std::collections::BTreeMap;
use std::path::Path;

/// Parsed `emit` arguments.
#[derive(Debug)]
pub struct EmitInput<'a> {
    pub severity: Severity,
    pub message: &'a str,
    pub config: Option<&'a Path>,
    pub threshold: Option<LogLevel>,
    pub dev: bool,
    pub force_debug: bool,
    pub fields: &'a [(String, String)],
    pub context_fields: &'a [(String, String)],
}

/// Write one record through a logger built from config, env, and flags.
///
/// Flags override `CTXLOG_*` variables, which override the config file.
pub fn run_emit(
    input: &EmitInput<'_>,
    mut env: BTreeMap<String, String>,
) -> Result<CliOutput, CliError> {
    if let Some(level) = input.threshold {
        env.insert(ctxlog::ENV_LEVEL.to_owned(), level.as_str().to_owned());
    }
    if input.dev {
        env.insert(ctxlog::ENV_DEV_MODE.to_owned(), "true".to_owned());
    }

    let logger = logger_from_env_map(&env, input.config)?;

    let mut ctx = LogContext::new().with_fields(to_log_values(input.context_fields));
    if input.force_debug {
        ctx = ctx.with_force_debug();
    }
    let kv = to_log_values(input.fields);

    match input.severity {
        Severity::Debug => logger.debug(&ctx, input.message, &kv),
        Severity::Info => logger.info(&ctx, input.message, &kv),
        Severity::Warn => logger.warn(&ctx, input.message, &kv),
        Severity::Error => logger.error(&ctx, input.message, &kv),
        Severity::Important => logger.important(&ctx, input.message, &kv),
    }
    logger.pipeline().flush()?;

    Ok(CliOutput {
        stdout: String::new(),
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
