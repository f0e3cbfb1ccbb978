//! Human-readable console encoder used in dev mode.

use super::{Encoder, Entry, format_time};
use ctxlog_ports::LogLevel;
use std::io::{self, Write};

const RESET: &str = "\x1b[0m";

/// Writes `time\tLEVEL\tdir/file.rs:line\tmessage\t{"k": v}`.
///
/// The caller column is omitted when the entry has no caller and the field
/// object is omitted when there are no fields.
#[derive(Debug, Clone, Default)]
pub struct ConsoleEncoder {
    strip_time: bool,
    colored: bool,
}

impl ConsoleEncoder {
    /// Plain console encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strip_time: false,
            colored: false,
        }
    }

    /// Replace timestamps with a placeholder.
    #[must_use]
    pub const fn with_strip_time(mut self, strip: bool) -> Self {
        self.strip_time = strip;
        self
    }

    /// Wrap the level token in ANSI colour codes.
    #[must_use]
    pub const fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }
}

const fn level_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "\x1b[35m",
        LogLevel::Info => "\x1b[34m",
        LogLevel::Warn => "\x1b[33m",
        LogLevel::Error => "\x1b[31m",
    }
}

impl Encoder for ConsoleEncoder {
    fn encode(&self, entry: &Entry<'_>, buf: &mut Vec<u8>) -> io::Result<()> {
        buf.extend_from_slice(format_time(&entry.time, self.strip_time).as_bytes());
        buf.push(b'\t');

        if self.colored {
            let color = level_color(entry.level);
            write!(buf, "{color}{}{RESET}", entry.level.as_upper_str())?;
        } else {
            buf.extend_from_slice(entry.level.as_upper_str().as_bytes());
        }

        if let Some(caller) = entry.caller {
            buf.push(b'\t');
            buf.extend_from_slice(caller.short().as_bytes());
        }

        buf.push(b'\t');
        buf.extend_from_slice(entry.message.as_bytes());

        if !entry.fields.is_empty() {
            buf.extend_from_slice(b"\t{");
            for (index, field) in entry.fields.iter().enumerate() {
                if index > 0 {
                    buf.extend_from_slice(b", ");
                }
                serde_json::to_writer(&mut *buf, field.key)?;
                buf.extend_from_slice(b": ");
                serde_json::to_writer(&mut *buf, field.value)?;
            }
            buf.push(b'}');
        }

        buf.push(b'\n');
        Ok(())
    }
}
