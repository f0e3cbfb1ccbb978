//! Caller location capture.
//!
//! Log methods are `#[track_caller]`, so `Location::caller()` already points
//! at the application frame that called the logger. Extra skips requested
//! through `Logger::skip_caller` walk the stack from that frame outwards.
//! Resolving a skip needs line tables; without them the direct call site is
//! reported.

use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};

/// Source location attached to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    file: String,
    line: u32,
}

impl Caller {
    /// Build a caller from a file path and line.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Caller recorded by `#[track_caller]`.
    #[must_use]
    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }

    /// Full file path as recorded.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// `dir/file.rs:line`, keeping only the last directory.
    #[must_use]
    pub fn short(&self) -> String {
        let mut parts = self.file.rsplit(['/', '\\']);
        let file = parts.next().unwrap_or_default();
        match parts.next() {
            Some(dir) if !dir.is_empty() => format!("{dir}/{file}:{}", self.line),
            _ => format!("{file}:{}", self.line),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.short())
    }
}

/// Resolve the caller `skip` logical frames above `location`.
#[must_use]
pub fn resolve(location: &Location<'_>, skip: usize) -> Caller {
    if skip == 0 {
        return Caller::from_location(location);
    }

    let frames = symbolized_frames();
    let anchor = Path::new(location.file());
    let origin = frames
        .iter()
        .position(|(file, line)| *line == location.line() && file.ends_with(anchor))
        .or_else(|| frames.iter().position(|(file, _)| file.ends_with(anchor)));

    origin
        .and_then(|index| frames.get(index + skip))
        .map_or_else(
            || Caller::from_location(location),
            |(file, line)| Caller::new(file.to_string_lossy(), *line),
        )
}

/// Current stack as `(file, line)` pairs, innermost first, with inlined
/// functions expanded into their own entries.
fn symbolized_frames() -> Vec<(PathBuf, u32)> {
    let mut frames = Vec::new();
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                frames.push((file.to_path_buf(), line));
            }
        });
        true
    });
    frames
}
