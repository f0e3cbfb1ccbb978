//! Config loading helpers (env + file).
//!
//! Precedence (highest wins):
//! - env overrides (`LogEnv`)
//! - config file (JSON or TOML)
//! - defaults (`LogConfig::default()`, level `error`)

use crate::schema::{DEFAULT_CONFIG_LEVEL, LogConfig, parse_log_config_json, parse_log_config_toml};
use crate::{LogEnv, apply_env_overrides};
use ctxlog_shared::{ErrorCode, ErrorEnvelope};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the config from an in-memory JSON document and env overrides.
pub fn load_log_config_from_sources(
    config_json: Option<&str>,
    env: &LogEnv,
) -> Result<LogConfig, ErrorEnvelope> {
    let config = match config_json {
        None => LogConfig::default(),
        Some(input) => parse_log_config_json(input).map_err(|error| {
            error.with_metadata("source", "config")
        })?,
    };

    Ok(finish(config, env))
}

/// Load the config from an optional file path and env overrides.
pub fn load_log_config_from_path(
    config_path: Option<&Path>,
    env: &LogEnv,
) -> Result<LogConfig, ErrorEnvelope> {
    let config = match config_path {
        None => LogConfig::default(),
        Some(path) => {
            let format = detect_config_format(path)?;
            let config_text = read_config_file(path)?;
            tracing::debug!(path = %path.display(), ?format, "loading logger config file");
            parse(&config_text, format)
                .map_err(|error| error.with_metadata("path", path.to_string_lossy().to_string()))?
        },
    };

    Ok(finish(config, env))
}

/// Load the config from the process environment and an optional file path.
pub fn load_log_config_std_env(config_path: Option<&Path>) -> Result<LogConfig, ErrorEnvelope> {
    let env = LogEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_log_config_from_path(config_path, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &LogConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_json"),
            format!("failed to serialize config: {error}"),
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &LogConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
        )
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn finish(config: LogConfig, env: &LogEnv) -> LogConfig {
    let mut config = apply_env_overrides(config, env);
    if config.level.is_none() {
        config.level = Some(DEFAULT_CONFIG_LEVEL);
    }
    config
}

fn parse(input: &str, format: ConfigFormat) -> Result<LogConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => parse_log_config_json(input),
        ConfigFormat::Toml => parse_log_config_toml(input),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}
