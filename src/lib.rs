//! # sea-orm-logger
//!
//! Route SeaORM query logs into `tracing`.
//!
//! Every statement executed through a [`LoggedConnection`] is handed to a
//! [`Logger`]. The bundled [`SeaOrmLogger`] decides what to emit: failed
//! statements at ERROR, slow statements at WARN, and every statement at INFO,
//! each filtered by the configured minimum level and annotated with the
//! `file:line` of the application code that ran the query.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sea_orm::Database;
//! use sea_orm_logger::LoggedConnection;
//!
//! // Wrap your existing connection
//! let db = Database::connect("postgres://localhost/mydb").await?;
//! let logged_db = LoggedConnection::from(db);
//!
//! // Use it exactly like a normal DatabaseConnection
//! let users = Users::find().all(&logged_db).await?;
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use sea_orm_logger::{LogLevel, LoggedConnection, LoggerConfig, SeaOrmLogger};
//!
//! let logger = SeaOrmLogger::from_config(
//!     LoggerConfig::default()
//!         .with_level(LogLevel::Warn)
//!         .with_slow_threshold(Duration::from_millis(100))
//!         .with_ignore_record_not_found(true)
//!         .with_field("service", "billing"),
//! );
//!
//! let logged_db = LoggedConnection::new(db, logger);
//! ```
//!
//! ## Message Format
//!
//! | Level | Message |
//! |-------|---------|
//! | ERROR | `{caller} {error}\n[{ms:.3}ms] [rows:{rows}] {sql}` |
//! | WARN  | `{caller} SLOW SQL >= {threshold}\n[{ms:.3}ms] [rows:{rows}] {sql}` |
//! | INFO  | `{caller}\n[{ms:.3}ms] [rows:{rows}] {sql}` |
//!
//! `rows` is `-` when the row count is unknown. The INFO line is written for
//! every statement, including ones already reported at ERROR or WARN.

pub mod callsite;
mod config;
mod connection;
pub mod event;
mod level;
mod logger;

pub use config::LoggerConfig;
pub use connection::{LoggedConnection, LoggingExt};
pub use event::{Event, EventFactory, TracingEvent};
pub use level::LogLevel;
pub use logger::{Logger, Rows, SeaOrmLogger};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Event, LogLevel, LoggedConnection, Logger, LoggerConfig, LoggingExt, SeaOrmLogger,
    };
}
