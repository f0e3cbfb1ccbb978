//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but empty or
//! unparseable fails instead of being ignored.

use crate::schema::{LogConfig, OutputTarget};
use ctxlog_ports::LogLevel;
use ctxlog_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: verbosity floor.
pub const ENV_LEVEL: &str = "CTXLOG_LEVEL";
/// Env var: dev (console) rendering.
pub const ENV_DEV_MODE: &str = "CTXLOG_DEV_MODE";
/// Env var: ANSI colour on the level token.
pub const ENV_COLORED_OUTPUT: &str = "CTXLOG_COLORED_OUTPUT";
/// Env var: replace timestamps with a placeholder.
pub const ENV_STRIP_TIME: &str = "CTXLOG_STRIP_TIME";
/// Env var: default output stream (`stdout` or `stderr`).
pub const ENV_OUTPUT: &str = "CTXLOG_OUTPUT";
/// Env var: JSON message key override.
pub const ENV_FIELD_NAMES_MESSAGE: &str = "CTXLOG_FIELD_NAMES_MESSAGE";
/// Env var: JSON timestamp key override.
pub const ENV_FIELD_NAMES_TIMESTAMP: &str = "CTXLOG_FIELD_NAMES_TIMESTAMP";

const ALL_VARS: [&str; 7] = [
    ENV_LEVEL,
    ENV_DEV_MODE,
    ENV_COLORED_OUTPUT,
    ENV_STRIP_TIME,
    ENV_OUTPUT,
    ENV_FIELD_NAMES_MESSAGE,
    ENV_FIELD_NAMES_TIMESTAMP,
];

/// Typed env-derived overrides for `LogConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEnv {
    /// Override for `level`.
    pub level: Option<LogLevel>,
    /// Override for `devMode`.
    pub dev_mode: Option<bool>,
    /// Override for `coloredOutput`.
    pub colored_output: Option<bool>,
    /// Override for `stripTime`.
    pub strip_time: Option<bool>,
    /// Override for `output`.
    pub output: Option<OutputTarget>,
    /// Override for `fieldNames.message`.
    pub field_names_message: Option<String>,
    /// Override for `fieldNames.timestamp`.
    pub field_names_timestamp: Option<String>,
}

impl LogEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            level: parse_optional_level(map, ENV_LEVEL)?,
            dev_mode: parse_optional_bool(map, ENV_DEV_MODE)?,
            colored_output: parse_optional_bool(map, ENV_COLORED_OUTPUT)?,
            strip_time: parse_optional_bool(map, ENV_STRIP_TIME)?,
            output: parse_optional_output(map, ENV_OUTPUT)?,
            field_names_message: parse_optional_trimmed_string(map, ENV_FIELD_NAMES_MESSAGE)?,
            field_names_timestamp: parse_optional_trimmed_string(map, ENV_FIELD_NAMES_TIMESTAMP)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_owned(), value);
            }
        }
        Self::from_map(&map)
    }

    /// Whether no variable was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply env overrides on top of `base` and normalize the result.
#[must_use]
pub fn apply_env_overrides(base: LogConfig, env: &LogEnv) -> LogConfig {
    let mut config = base;

    if let Some(level) = env.level {
        config.level = Some(level);
    }
    set_bool(&mut config.dev_mode, env.dev_mode);
    set_bool(&mut config.colored_output, env.colored_output);
    set_bool(&mut config.strip_time, env.strip_time);
    if let Some(output) = env.output {
        config.output = output;
    }
    if let Some(message) = &env.field_names_message {
        config.field_names.message = Some(message.clone());
    }
    if let Some(timestamp) = &env.field_names_timestamp {
        config.field_names.timestamp = Some(timestamp.clone());
    }

    config.normalize()
}

const fn set_bool(field: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var (level, output) had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidBool { var, .. } => write!(formatter, "{var} must be a boolean"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidBool { var, value } | EnvParseError::InvalidEnum { var, value } => {
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", value)
            },
        }
    }
}

fn non_empty<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<&'a str>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed))
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvParseError> {
    Ok(non_empty(map, var)?.map(str::to_owned))
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: trimmed.to_owned(),
        }),
    }
}

fn parse_optional_level(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<LogLevel>, EnvParseError> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };

    trimmed
        .parse::<LogLevel>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidEnum {
            var,
            value: trimmed.to_owned(),
        })
}

fn parse_optional_output(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<OutputTarget>, EnvParseError> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };

    trimmed
        .parse::<OutputTarget>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidEnum {
            var,
            value: trimmed.to_owned(),
        })
}
