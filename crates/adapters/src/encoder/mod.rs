//! Record encoders.
//!
//! An encoder turns one [`Entry`] into one newline-terminated record. Fields
//! are written in the order given, duplicates included.

mod console;
mod json;

pub use console::ConsoleEncoder;
pub use json::JsonEncoder;

use crate::caller::Caller;
use chrono::{DateTime, SecondsFormat, Utc};
use ctxlog_ports::{LogLevel, LogValue};
use std::io;

/// Timestamp placeholder written when time stripping is enabled.
pub const STRIPPED_TIME: &str = "<stripped>";

/// A single key/value field ready for encoding.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    /// Field key.
    pub key: &'a str,
    /// Field value.
    pub value: &'a LogValue,
}

impl<'a> Field<'a> {
    /// Pair a key with a value.
    #[must_use]
    pub const fn new(key: &'a str, value: &'a LogValue) -> Self {
        Self { key, value }
    }
}

/// A fully assembled record.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Severity.
    pub level: LogLevel,
    /// Wall-clock time of the call.
    pub time: DateTime<Utc>,
    /// Call site, when caller annotation is enabled.
    pub caller: Option<&'a Caller>,
    /// Message.
    pub message: &'a str,
    /// Static pipeline fields followed by record fields.
    pub fields: &'a [Field<'a>],
}

/// Serializes records.
pub trait Encoder: Send + Sync {
    /// Append one encoded record, including the trailing newline, to `buf`.
    fn encode(&self, entry: &Entry<'_>, buf: &mut Vec<u8>) -> io::Result<()>;
}

fn format_time(time: &DateTime<Utc>, strip: bool) -> String {
    if strip {
        STRIPPED_TIME.to_owned()
    } else {
        time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_is_rfc3339_with_millis() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).single();
        let formatted = time.map(|time| format_time(&time, false));
        assert_eq!(formatted.as_deref(), Some("2024-05-01T12:30:00.000Z"));
    }

    #[test]
    fn stripped_time_is_constant() {
        assert_eq!(format_time(&Utc::now(), true), STRIPPED_TIME);
    }
}
