//! Config command handlers.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::ConfigFormat;
use ctxlog::{ErrorEnvelope, LogEnv, load_log_config_from_path, to_pretty_json, to_pretty_toml};
use std::collections::BTreeMap;
use std::path::Path;

/// Print the effective logger config after file and env overrides.
pub fn run_config_show(
    path: Option<&Path>,
    format: ConfigFormat,
    env: &BTreeMap<String, String>,
) -> Result<CliOutput, CliError> {
    let env = LogEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    let config = load_log_config_from_path(path, &env)?;
    tracing::debug!(?format, "rendering effective config");

    let stdout = match format {
        ConfigFormat::Json => to_pretty_json(&config)?,
        ConfigFormat::Toml => to_pretty_toml(&config)?,
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
