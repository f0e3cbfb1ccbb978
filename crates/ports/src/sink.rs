//! Output sink contract.

use std::io;

/// A sink that receives fully encoded log records.
///
/// Each `write_line` call carries exactly one record, newline included.
/// Implementations must write it atomically with respect to other callers:
/// concurrent records may be reordered but never interleaved.
pub trait LogSink: Send + Sync {
    /// Write one encoded record.
    fn write_line(&self, line: &[u8]) -> io::Result<()>;

    /// Flush buffered output, if any.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}
