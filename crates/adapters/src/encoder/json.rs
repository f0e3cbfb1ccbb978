//! Single-line JSON encoder.

use super::{Encoder, Entry, format_time};
use ctxlog_config::{DEFAULT_MESSAGE_KEY, DEFAULT_TIMESTAMP_KEY};
use serde::Serialize;
use std::io;

const LEVEL_KEY: &str = "level";
const CALLER_KEY: &str = "caller";

/// Writes `{"level":..,"time":..,["caller":..,]"msg":..,<fields>}`.
///
/// The object is written by hand so repeated keys survive as given.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    message_key: String,
    time_key: String,
    strip_time: bool,
}

impl JsonEncoder {
    /// Encoder with the default `msg`/`time` keys.
    #[must_use]
    pub fn new() -> Self {
        Self {
            message_key: DEFAULT_MESSAGE_KEY.to_owned(),
            time_key: DEFAULT_TIMESTAMP_KEY.to_owned(),
            strip_time: false,
        }
    }

    /// Override the message key.
    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = key.into();
        self
    }

    /// Override the timestamp key.
    #[must_use]
    pub fn with_time_key(mut self, key: impl Into<String>) -> Self {
        self.time_key = key.into();
        self
    }

    /// Replace timestamps with a placeholder.
    #[must_use]
    pub const fn with_strip_time(mut self, strip: bool) -> Self {
        self.strip_time = strip;
        self
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, entry: &Entry<'_>, buf: &mut Vec<u8>) -> io::Result<()> {
        let mut object = ObjectWriter::new(buf);
        object.entry(LEVEL_KEY, entry.level.as_str())?;
        object.entry(&self.time_key, &format_time(&entry.time, self.strip_time))?;
        if let Some(caller) = entry.caller {
            object.entry(CALLER_KEY, &caller.short())?;
        }
        object.entry(&self.message_key, entry.message)?;
        for field in entry.fields {
            object.entry(field.key, field.value)?;
        }
        object.finish();
        Ok(())
    }
}

struct ObjectWriter<'b> {
    buf: &'b mut Vec<u8>,
    first: bool,
}

impl<'b> ObjectWriter<'b> {
    fn new(buf: &'b mut Vec<u8>) -> Self {
        buf.push(b'{');
        Self { buf, first: true }
    }

    fn entry<V>(&mut self, key: &str, value: &V) -> io::Result<()>
    where
        V: Serialize + ?Sized,
    {
        if !self.first {
            self.buf.push(b',');
        }
        self.first = false;
        serde_json::to_writer(&mut *self.buf, key)?;
        self.buf.push(b':');
        serde_json::to_writer(&mut *self.buf, value)?;
        Ok(())
    }

    fn finish(self) {
        self.buf.extend_from_slice(b"}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::Caller;
    use crate::encoder::Field;
    use chrono::Utc;
    use ctxlog_ports::{LogLevel, LogValue};
    use serde_json::Value;

    fn encode(encoder: &JsonEncoder, entry: &Entry<'_>) -> Result<String, Box<dyn std::error::Error>> {
        let mut buf = Vec::new();
        encoder.encode(entry, &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    #[test]
    fn writes_fixed_keys_then_fields() -> Result<(), Box<dyn std::error::Error>> {
        let one = LogValue::from(1);
        let text = LogValue::from("x");
        let fields = [Field::new("a", &one), Field::new("b", &text)];
        let entry = Entry {
            level: LogLevel::Warn,
            time: Utc::now(),
            caller: None,
            message: "hello",
            fields: &fields,
        };

        let line = encode(&JsonEncoder::new().with_strip_time(true), &entry)?;
        assert_eq!(
            line,
            "{\"level\":\"warn\",\"time\":\"<stripped>\",\"msg\":\"hello\",\"a\":1,\"b\":\"x\"}\n"
        );
        Ok(())
    }

    #[test]
    fn duplicate_keys_are_preserved() -> Result<(), Box<dyn std::error::Error>> {
        let first = LogValue::from(1);
        let second = LogValue::from(2);
        let fields = [Field::new("k", &first), Field::new("k", &second)];
        let entry = Entry {
            level: LogLevel::Info,
            time: Utc::now(),
            caller: None,
            message: "dup",
            fields: &fields,
        };

        let line = encode(&JsonEncoder::new(), &entry)?;
        assert!(line.ends_with(",\"k\":1,\"k\":2}\n"));
        Ok(())
    }

    #[test]
    fn custom_keys_and_caller() -> Result<(), Box<dyn std::error::Error>> {
        let caller = Caller::new("src/service/handler.rs", 12);
        let entry = Entry {
            level: LogLevel::Error,
            time: Utc::now(),
            caller: Some(&caller),
            message: "boom",
            fields: &[],
        };
        let encoder = JsonEncoder::new()
            .with_message_key("message")
            .with_time_key("ts");

        let line = encode(&encoder, &entry)?;
        let payload: Value = serde_json::from_str(line.trim_end())?;
        assert_eq!(payload.get("message"), Some(&Value::from("boom")));
        assert_eq!(payload.get("caller"), Some(&Value::from("service/handler.rs:12")));
        assert!(payload.get("ts").is_some());
        assert!(payload.get("msg").is_none());
        Ok(())
    }
}
