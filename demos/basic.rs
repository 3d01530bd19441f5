//! Basic example showing how to use sea-orm-logger.
//!
//! Run with: cargo run --example basic

use std::fmt;
use std::time::Duration;

use sea_orm::{
    ConnectionTrait, DbBackend, DbErr, MockDatabase, MockExecResult, Statement,
};
use sea_orm_logger::prelude::*;
use sea_orm_logger::TracingEvent;
use tracing::Dispatch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Emits through a dedicated dispatcher instead of the global one.
struct DispatchEvent {
    dispatch: Dispatch,
    inner: Box<dyn Event>,
}

impl Event for DispatchEvent {
    fn str(mut self: Box<Self>, key: &str, value: &str) -> Box<dyn Event> {
        self.inner = self.inner.str(key, value);
        self
    }

    fn msgf(self: Box<Self>, args: fmt::Arguments<'_>) {
        let DispatchEvent { dispatch, inner } = *self;
        tracing::dispatcher::with_default(&dispatch, || inner.msgf(args));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sea_orm_logger=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A mock database stands in for a real one
    let db = MockDatabase::new(DbBackend::Sqlite)
        .append_exec_results([MockExecResult {
            last_insert_id: 1,
            rows_affected: 1,
        }])
        .append_exec_errors([DbErr::Custom("UNIQUE constraint failed: users.name".into())])
        .into_connection();

    // Option 1: Simple wrapping with defaults
    let logged_db = LoggedConnection::from(db);

    // Option 2: Using the extension trait (more fluent)
    // let logged_db = db.with_default_logger();

    // Option 3: With custom configuration
    // let logged_db = db.with_logger(SeaOrmLogger::from_config(
    //     LoggerConfig::default()
    //         .with_level(LogLevel::Warn)
    //         .with_slow_threshold(Duration::from_millis(100))
    // ));

    let insert = Statement::from_string(
        DbBackend::Sqlite,
        "INSERT INTO users (name) VALUES ('user1')",
    );
    logged_db.execute(insert.clone()).await?;

    // Info events go to a compact console subscriber with timestamps off
    let console = Dispatch::new(
        tracing_subscriber::fmt()
            .compact()
            .without_time()
            .finish(),
    );
    let mut logger = SeaOrmLogger::from_config(
        LoggerConfig::development()
            .with_slow_threshold(Duration::from_millis(50))
            .with_field("app", "demo"),
    )
    .with_info(move || {
        Box::new(DispatchEvent {
            dispatch: console.clone(),
            inner: Box::new(TracingEvent::new(tracing::Level::INFO)),
        }) as Box<dyn Event>
    });
    logger.ignore_record_not_found_error(true);

    let logged_db = logged_db.with_logger(logger);
    if let Err(err) = logged_db.execute(insert).await {
        tracing::info!(error = %err, "second insert failed as expected");
    }

    // The logger can also be used directly
    logged_db
        .logger()
        .info(format_args!("migrated {} tables", 1));

    Ok(())
}
