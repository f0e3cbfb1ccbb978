//! Logger configuration schema, defaults, and normalization.
//!
//! - Deserialization uses `serde` (JSON and TOML).
//! - Unknown fields are rejected; every field is optional.
//! - Normalization trims field-name overrides and drops empty ones, so an
//!   empty override falls back to the default key instead of producing an
//!   unnamed JSON field.

use ctxlog_ports::LogLevel;
use ctxlog_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default JSON key for the record message.
pub const DEFAULT_MESSAGE_KEY: &str = "msg";
/// Default JSON key for the record timestamp.
pub const DEFAULT_TIMESTAMP_KEY: &str = "time";
/// Level applied by the declarative loaders when no source sets one.
pub const DEFAULT_CONFIG_LEVEL: LogLevel = LogLevel::Error;

/// Declarative logger configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LogConfig {
    /// Verbosity floor. Unset means the logger constructor starts at `info`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    /// Human-readable console output with caller annotation.
    pub dev_mode: bool,
    /// ANSI colour on the level token (dev mode only).
    pub colored_output: bool,
    /// JSON key overrides.
    pub field_names: FieldNames,
    /// Default destination when no sink is supplied.
    pub output: OutputTarget,
    /// Replace timestamps with a fixed placeholder.
    pub strip_time: bool,
}

impl LogConfig {
    /// Normalize free-form fields.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.field_names = self.field_names.normalize();
        self
    }

    /// Starting threshold for a logger built from this config.
    #[must_use]
    pub fn effective_level(&self) -> LogLevel {
        self.level.unwrap_or_default()
    }
}

/// JSON key overrides for the message and timestamp fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FieldNames {
    /// Key for the message (default `msg`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Key for the timestamp (default `time`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl FieldNames {
    /// Effective message key.
    #[must_use]
    pub fn message_key(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_MESSAGE_KEY)
    }

    /// Effective timestamp key.
    #[must_use]
    pub fn timestamp_key(&self) -> &str {
        self.timestamp.as_deref().unwrap_or(DEFAULT_TIMESTAMP_KEY)
    }

    fn normalize(self) -> Self {
        Self {
            message: normalize_key(self.message),
            timestamp: normalize_key(self.timestamp),
        }
    }
}

fn normalize_key(value: Option<String>) -> Option<String> {
    value
        .map(|key| key.trim().to_owned())
        .filter(|key| !key.is_empty())
}

/// Process stream used when no sink is supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
}

impl OutputTarget {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for OutputTarget {
    type Err = ErrorEnvelope;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_output"),
                format!("unknown output target: {input}"),
            )),
        }
    }
}

/// Parse a config from a JSON string and normalize it.
pub fn parse_log_config_json(input: &str) -> Result<LogConfig, ErrorEnvelope> {
    let config: LogConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;
    Ok(config.normalize())
}

/// Parse a config from a TOML string and normalize it.
pub fn parse_log_config_toml(input: &str) -> Result<LogConfig, ErrorEnvelope> {
    let config: LogConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;
    Ok(config.normalize())
}
