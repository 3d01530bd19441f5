//! Configuration for query logging behavior.

use std::collections::HashMap;
use std::time::Duration;

use crate::level::LogLevel;

/// Configuration options for [`SeaOrmLogger`](crate::SeaOrmLogger).
///
/// # Example
///
/// ```rust
/// use sea_orm_logger::{LogLevel, LoggerConfig};
/// use std::time::Duration;
///
/// let config = LoggerConfig::default()
///     .with_level(LogLevel::Warn)
///     .with_slow_threshold(Duration::from_millis(100))
///     .with_field("service", "billing");
/// ```
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level that gets emitted.
    /// Default: `LogLevel::Info`
    pub level: LogLevel,

    /// Queries running longer than this are reported at WARN level.
    /// A zero duration disables slow query detection.
    /// Default: 200ms
    pub slow_threshold: Duration,

    /// Whether `DbErr::RecordNotFound` is kept out of error logs.
    /// Default: `false`
    pub ignore_record_not_found: bool,

    /// String fields attached to every emitted event.
    /// Default: empty
    pub additional_data: HashMap<String, String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            slow_threshold: Duration::from_millis(200),
            ignore_record_not_found: false,
            additional_data: HashMap::new(),
        }
    }
}

impl LoggerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum level to emit.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the threshold for slow query warnings.
    ///
    /// `Duration::ZERO` turns slow query detection off.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Keep `DbErr::RecordNotFound` out of error logs.
    pub fn with_ignore_record_not_found(mut self, ignore: bool) -> Self {
        self.ignore_record_not_found = ignore;
        self
    }

    /// Attach a field to every emitted event.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }

    /// Create a development-friendly configuration that logs every statement.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Info,
            slow_threshold: Duration::from_millis(100),
            ignore_record_not_found: false,
            additional_data: HashMap::new(),
        }
    }

    /// Create a production configuration: warnings and errors only, lookups
    /// that find nothing are not treated as failures.
    pub fn production() -> Self {
        Self {
            level: LogLevel::Warn,
            slow_threshold: Duration::from_secs(1),
            ignore_record_not_found: true,
            additional_data: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::new();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.slow_threshold, Duration::from_millis(200));
        assert!(!config.ignore_record_not_found);
        assert!(config.additional_data.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = LoggerConfig::default()
            .with_level(LogLevel::Error)
            .with_slow_threshold(Duration::ZERO)
            .with_ignore_record_not_found(true)
            .with_field("service", "billing")
            .with_field("service", "accounts");

        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.slow_threshold, Duration::ZERO);
        assert!(config.ignore_record_not_found);
        assert_eq!(config.additional_data.len(), 1);
        assert_eq!(config.additional_data["service"], "accounts");
    }

    #[test]
    fn test_presets() {
        let dev = LoggerConfig::development();
        assert_eq!(dev.level, LogLevel::Info);
        assert!(!dev.ignore_record_not_found);

        let prod = LoggerConfig::production();
        assert_eq!(prod.level, LogLevel::Warn);
        assert_eq!(prod.slow_threshold, Duration::from_secs(1));
        assert!(prod.ignore_record_not_found);
    }
}
