//! Level filtering and event construction for SeaORM query logs.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use sea_orm::DbErr;

use crate::callsite::file_with_line_num;
use crate::config::LoggerConfig;
use crate::event::{self, Event, EventFactory};
use crate::level::LogLevel;

/// The logging contract a database connection drives.
///
/// `info`, `warn` and `error` forward an already formatted message. `trace`
/// is called once per executed statement with its start time, a callback
/// yielding the SQL text and affected row count (`-1` when unknown), and the
/// error the statement failed with, if any.
pub trait Logger: Send + Sync {
    /// Set the minimum level to emit.
    fn log_mode(&mut self, level: LogLevel) -> &mut dyn Logger;

    fn info(&self, args: fmt::Arguments<'_>);

    fn warn(&self, args: fmt::Arguments<'_>);

    fn error(&self, args: fmt::Arguments<'_>);

    fn trace(&self, begin: Instant, fc: &dyn Fn() -> (String, i64), err: Option<&DbErr>);
}

/// Affected row count as printed in trace lines: `-1` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rows(pub i64);

impl fmt::Display for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            -1 => f.write_str("-"),
            rows => write!(f, "{}", rows),
        }
    }
}

/// Routes SeaORM logs into `tracing`.
///
/// Every level has an [`EventFactory`]; by default these emit on the global
/// `tracing` dispatcher. Replace them with [`with_info`](Self::with_info) and
/// friends to send events to a differently configured sink.
///
/// # Trace output
///
/// `trace` reports a failed statement at ERROR level, or a statement slower
/// than the threshold at WARN level. It then *also* reports the statement at
/// INFO level, whatever happened above. A failed query logged at `Info`
/// therefore produces two events.
///
/// # Example
///
/// ```rust
/// use sea_orm_logger::{LogLevel, Logger, SeaOrmLogger};
/// use std::time::Duration;
///
/// let mut logger = SeaOrmLogger::new();
/// logger.slow_threshold(Duration::from_millis(50));
/// logger.ignore_record_not_found_error(true);
/// logger.log_mode(LogLevel::Warn);
/// ```
#[derive(Clone)]
pub struct SeaOrmLogger {
    log_level: LogLevel,
    ignore_record_not_found_err: bool,
    slow_threshold: Duration,
    loggers: HashMap<LogLevel, EventFactory>,

    /// Fields attached to every emitted event.
    pub additional_data: HashMap<String, String>,
}

impl SeaOrmLogger {
    /// Create a logger with default settings: `Info` level, 200ms slow
    /// threshold, record-not-found errors reported.
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    /// Create a logger from a configuration.
    pub fn from_config(config: LoggerConfig) -> Self {
        let mut loggers: HashMap<LogLevel, EventFactory> = HashMap::new();
        loggers.insert(LogLevel::Info, event::factory(event::new_info_event));
        loggers.insert(LogLevel::Warn, event::factory(event::new_warn_event));
        loggers.insert(LogLevel::Error, event::factory(event::new_error_event));

        Self {
            log_level: config.level,
            ignore_record_not_found_err: config.ignore_record_not_found,
            slow_threshold: config.slow_threshold,
            loggers,
            additional_data: config.additional_data,
        }
    }

    /// Set the event factory for info level logging.
    pub fn with_info<F>(mut self, info: F) -> Self
    where
        F: Fn() -> Box<dyn Event> + Send + Sync + 'static,
    {
        self.set_event_factory(LogLevel::Info, event::factory(info));
        self
    }

    /// Set the event factory for warn level logging.
    pub fn with_warn<F>(mut self, warn: F) -> Self
    where
        F: Fn() -> Box<dyn Event> + Send + Sync + 'static,
    {
        self.set_event_factory(LogLevel::Warn, event::factory(warn));
        self
    }

    /// Set the event factory for error level logging.
    pub fn with_error<F>(mut self, error: F) -> Self
    where
        F: Fn() -> Box<dyn Event> + Send + Sync + 'static,
    {
        self.set_event_factory(LogLevel::Error, event::factory(error));
        self
    }

    /// Replace the event factory for `level`.
    ///
    /// Factories registered for [`LogLevel::Silent`] are never used.
    pub fn set_event_factory(&mut self, level: LogLevel, factory: EventFactory) {
        self.loggers.insert(level, factory);
    }

    /// Drop the event factory for `level`. Logging at that level becomes a no-op.
    pub fn remove_event_factory(&mut self, level: LogLevel) -> Option<EventFactory> {
        self.loggers.remove(&level)
    }

    /// Set the minimum level to emit.
    pub fn set_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    /// Keep `DbErr::RecordNotFound` out of error logs.
    pub fn ignore_record_not_found_error(&mut self, ignore: bool) {
        self.ignore_record_not_found_err = ignore;
    }

    /// Set the slow query threshold. `Duration::ZERO` disables slow query warnings.
    pub fn slow_threshold(&mut self, threshold: Duration) {
        self.slow_threshold = threshold;
    }

    pub fn level(&self) -> LogLevel {
        self.log_level
    }

    pub fn slow_threshold_value(&self) -> Duration {
        self.slow_threshold
    }

    pub fn ignores_record_not_found(&self) -> bool {
        self.ignore_record_not_found_err
    }

    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if level == LogLevel::Silent || self.log_level < level {
            return;
        }
        if let Some(factory) = self.loggers.get(&level) {
            self.additional_data
                .iter()
                .fold(factory(), |event, (key, value)| event.str(key, value))
                .msgf(args);
        }
    }

    /// Classify and emit a statement that ran for `elapsed`.
    pub(crate) fn record(
        &self,
        elapsed: Duration,
        fc: &dyn Fn() -> (String, i64),
        err: Option<&DbErr>,
    ) {
        if self.log_level <= LogLevel::Silent {
            return;
        }

        let (sql, rows) = fc();
        let rows = Rows(rows);
        let elapsed_ms = elapsed.as_nanos() as f64 / 1e6;
        let caller = file_with_line_num();

        match err {
            Some(err)
                if !matches!(err, DbErr::RecordNotFound(_))
                    || !self.ignore_record_not_found_err =>
            {
                self.log(
                    LogLevel::Error,
                    format_args!(
                        "{} {}\n[{:.3}ms] [rows:{}] {}",
                        caller, err, elapsed_ms, rows, sql
                    ),
                );
            }
            _ if elapsed > self.slow_threshold && !self.slow_threshold.is_zero() => {
                let slow_log = format!("SLOW SQL >= {:?}", self.slow_threshold);
                self.log(
                    LogLevel::Warn,
                    format_args!(
                        "{} {}\n[{:.3}ms] [rows:{}] {}",
                        caller, slow_log, elapsed_ms, rows, sql
                    ),
                );
            }
            _ => {}
        }

        self.log(
            LogLevel::Info,
            format_args!("{}\n[{:.3}ms] [rows:{}] {}", caller, elapsed_ms, rows, sql),
        );
    }
}

impl Default for SeaOrmLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SeaOrmLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut levels: Vec<_> = self.loggers.keys().collect();
        levels.sort();

        f.debug_struct("SeaOrmLogger")
            .field("log_level", &self.log_level)
            .field("ignore_record_not_found_err", &self.ignore_record_not_found_err)
            .field("slow_threshold", &self.slow_threshold)
            .field("loggers", &levels)
            .field("additional_data", &self.additional_data)
            .finish()
    }
}

impl From<LoggerConfig> for SeaOrmLogger {
    fn from(config: LoggerConfig) -> Self {
        Self::from_config(config)
    }
}

impl Logger for SeaOrmLogger {
    fn log_mode(&mut self, level: LogLevel) -> &mut dyn Logger {
        self.set_level(level);
        self
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    fn trace(&self, begin: Instant, fc: &dyn Fn() -> (String, i64), err: Option<&DbErr>) {
        if self.log_level <= LogLevel::Silent {
            return;
        }
        self.record(begin.elapsed(), fc, err);
    }
}
