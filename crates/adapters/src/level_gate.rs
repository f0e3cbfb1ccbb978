//! Level gates deciding whether a pipeline accepts a severity.

use ctxlog_ports::LogLevel;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Decides whether records at a level are written.
pub trait LevelEnabler: Send + Sync {
    /// Whether `level` is enabled.
    fn enabled(&self, level: LogLevel) -> bool;
}

/// A fixed level enables itself and everything more severe.
impl LevelEnabler for LogLevel {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= *self
    }
}

impl<T> LevelEnabler for Arc<T>
where
    T: LevelEnabler + ?Sized,
{
    fn enabled(&self, level: LogLevel) -> bool {
        (**self).enabled(level)
    }
}

/// Shared, atomically settable level.
///
/// Clones share the same storage: a level set through one handle is visible
/// to every other handle on their next read.
#[derive(Clone)]
pub struct AtomicLevel(Arc<AtomicU8>);

impl AtomicLevel {
    /// Create a level handle starting at `level`.
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        Self(Arc::new(AtomicU8::new(level.as_u8())))
    }

    /// Current level.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Replace the level.
    pub fn set_level(&self, level: LogLevel) {
        self.0.store(level.as_u8(), Ordering::Release);
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl LevelEnabler for AtomicLevel {
    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }
}

impl fmt::Debug for AtomicLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("AtomicLevel").field(&self.level()).finish()
    }
}
