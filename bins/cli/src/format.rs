//! Argument value types shared by CLI commands.

use clap::ValueEnum;
use ctxlog::LogValue;

/// Serialization format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConfigFormat {
    /// Pretty JSON.
    #[default]
    Json,
    /// TOML.
    Toml,
}

/// Severity of an emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Severity {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
    /// Info, written regardless of the threshold.
    Important,
}

/// Parse a `key=value` argument.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        },
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

/// Flatten parsed pairs into a key/value list. Values that parse as JSON keep
/// their type; anything else is written as a string.
pub fn to_log_values(pairs: &[(String, String)]) -> Vec<LogValue> {
    pairs
        .iter()
        .flat_map(|(key, raw)| {
            let value = serde_json::from_str::<serde_json::Value>(raw)
                .map_or_else(|_| LogValue::from(raw.as_str()), LogValue::from);
            [LogValue::from(key.as_str()), value]
        })
        .collect()
}
