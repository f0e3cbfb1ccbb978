//! Log sinks for encoded records.

use ctxlog_config::OutputTarget;
use ctxlog_ports::LogSink;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Log sink that writes to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(line)
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

/// Log sink that writes to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        io::stderr().lock().write_all(line)
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().lock().flush()
    }
}

/// Sink for the configured process stream.
#[must_use]
pub fn stream_sink(target: OutputTarget) -> Arc<dyn LogSink> {
    match target {
        OutputTarget::Stdout => Arc::new(StdoutSink),
        OutputTarget::Stderr => Arc::new(StderrSink),
    }
}

/// Adapts any `io::Write` into a sink; records are serialized by a mutex.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W> WriterSink<W>
where
    W: Write + Send,
{
    /// Wrap a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W> LogSink for WriterSink<W>
where
    W: Write + Send,
{
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line)
    }

    fn flush(&self) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()
    }
}

impl<W> fmt::Debug for WriterSink<W> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("WriterSink").finish_non_exhaustive()
    }
}

/// In-memory sink. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl BufferSink {
    /// Empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Everything written so far, as (lossy) UTF-8.
    #[must_use]
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// Written records, one per line, without trailing newlines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents_string().lines().map(str::to_owned).collect()
    }

    /// Drain the buffer.
    #[must_use]
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl LogSink for BufferSink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(line);
        Ok(())
    }
}

/// Sink that drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl LogSink for DiscardSink {
    fn write_line(&self, _line: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_captures_lines() {
        let sink = BufferSink::new();
        let shared = sink.clone();
        assert!(sink.write_line(b"hello\n").is_ok());
        assert!(shared.write_line(b"world\n").is_ok());

        assert_eq!(sink.lines(), vec!["hello".to_owned(), "world".to_owned()]);
        assert_eq!(sink.take(), b"hello\nworld\n".to_vec());
        assert!(shared.is_empty());
    }

    #[test]
    fn writer_sink_forwards_to_writer() {
        let sink = WriterSink::new(Vec::new());
        assert!(sink.write_line(b"{}\n").is_ok());
        assert!(LogSink::flush(&sink).is_ok());
        assert_eq!(sink.into_inner(), b"{}\n".to_vec());
    }

    #[test]
    fn discard_sink_accepts_everything() {
        assert!(DiscardSink.write_line(b"ignored\n").is_ok());
    }
}
