//! Log levels understood by the query logger.

use std::fmt;

/// Minimum severity a [`Logger`](crate::Logger) emits.
///
/// Levels are ordered by verbosity: `Silent < Error < Warn < Info`. A logger
/// configured at a given level emits everything at that level and below it,
/// so `Info` also lets warnings and errors through, while `Silent` drops
/// everything, including errors surfaced by `trace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    #[default]
    Info,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Silent => "silent",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
        }
    }

    /// The `tracing` level events at this level are emitted with.
    ///
    /// Returns `None` for [`LogLevel::Silent`], which never emits.
    pub fn as_tracing(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Silent => None,
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Info => Some(tracing::Level::INFO),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
