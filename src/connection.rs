//! Logged database connection wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    ExecResult, IsolationLevel, QueryResult, Statement, StreamTrait, TransactionError,
    TransactionTrait,
};

use crate::logger::{Logger, SeaOrmLogger};

/// Row count reported when the number of rows is not known.
const UNKNOWN_ROWS: i64 = -1;

/// A SeaORM `DatabaseConnection` that reports every statement to a [`Logger`].
///
/// This wrapper implements `ConnectionTrait`, `StreamTrait`, and `TransactionTrait`,
/// making it a drop-in replacement for `DatabaseConnection`. Each statement is
/// passed to [`Logger::trace`] with its duration, SQL text, row count, and error.
///
/// # Example
///
/// ```rust,ignore
/// use sea_orm::Database;
/// use sea_orm_logger::LoggedConnection;
///
/// let db = Database::connect("postgres://localhost/mydb").await?;
/// let logged = LoggedConnection::from(db);
///
/// // All queries are now logged
/// let users = Users::find().all(&logged).await?;
/// ```
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct LoggedConnection {
    inner: DatabaseConnection,
    logger: Arc<dyn Logger>,
}

impl LoggedConnection {
    /// Create a new logged connection reporting to `logger`.
    pub fn new(connection: DatabaseConnection, logger: impl Logger + 'static) -> Self {
        Self {
            inner: connection,
            logger: Arc::new(logger),
        }
    }

    /// Create a new logged connection with the default [`SeaOrmLogger`].
    pub fn wrap(connection: DatabaseConnection) -> Self {
        Self::new(connection, SeaOrmLogger::new())
    }

    /// Get a reference to the underlying `DatabaseConnection`.
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }

    /// Get the logger statements are reported to.
    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// Replace the logger. Clones made earlier keep the previous one.
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Consume the wrapper and return the inner `DatabaseConnection`.
    pub fn into_inner(self) -> DatabaseConnection {
        self.inner
    }

    /// Report a finished statement.
    fn trace<T>(
        &self,
        sql: &str,
        start: Instant,
        result: &Result<T, DbErr>,
        row_count: impl FnOnce(&T) -> i64,
    ) {
        let (rows, err) = match result {
            Ok(value) => (row_count(value), None),
            Err(e) => (UNKNOWN_ROWS, Some(e)),
        };
        self.logger
            .trace(start, &|| (sql.to_string(), rows), err);
    }
}

impl std::fmt::Debug for LoggedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggedConnection")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl From<DatabaseConnection> for LoggedConnection {
    fn from(connection: DatabaseConnection) -> Self {
        Self::wrap(connection)
    }
}

impl AsRef<DatabaseConnection> for LoggedConnection {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

#[async_trait]
impl ConnectionTrait for LoggedConnection {
    fn get_database_backend(&self) -> DbBackend {
        self.inner.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        let sql = stmt.to_string();
        let start = Instant::now();

        let result = self.inner.execute(stmt).await;

        self.trace(&sql, start, &result, |r| r.rows_affected() as i64);
        result
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        let start = Instant::now();

        let result = self.inner.execute_unprepared(sql).await;

        self.trace(sql, start, &result, |r| r.rows_affected() as i64);
        result
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        let sql = stmt.to_string();
        let start = Instant::now();

        let result = self.inner.query_one(stmt).await;

        self.trace(&sql, start, &result, |row| i64::from(row.is_some()));
        result
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        let sql = stmt.to_string();
        let start = Instant::now();

        let result = self.inner.query_all(stmt).await;

        self.trace(&sql, start, &result, |rows| rows.len() as i64);
        result
    }

    fn support_returning(&self) -> bool {
        self.inner.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.inner.is_mock_connection()
    }
}

#[async_trait]
impl StreamTrait for LoggedConnection {
    type Stream<'a> = <DatabaseConnection as StreamTrait>::Stream<'a>;

    fn stream<'a>(
        &'a self,
        stmt: Statement,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Stream<'a>, DbErr>> + 'a + Send>> {
        let sql = stmt.to_string();
        let start = Instant::now();

        Box::pin(async move {
            let result = self.inner.stream(stmt).await;

            // rows are only known once the stream is drained
            self.trace(&sql, start, &result, |_| UNKNOWN_ROWS);
            result
        })
    }
}

#[async_trait]
impl TransactionTrait for LoggedConnection {
    async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        let start = Instant::now();

        let result = self.inner.begin().await;

        self.trace("BEGIN", start, &result, |_| UNKNOWN_ROWS);
        result
    }

    async fn begin_with_config(
        &self,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<DatabaseTransaction, DbErr> {
        let start = Instant::now();

        let result = self
            .inner
            .begin_with_config(isolation_level, access_mode)
            .await;

        self.trace("BEGIN", start, &result, |_| UNKNOWN_ROWS);
        result
    }

    async fn transaction<F, T, E>(&self, callback: F) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        self.inner.transaction(callback).await
    }

    async fn transaction_with_config<F, T, E>(
        &self,
        callback: F,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        self.inner
            .transaction_with_config(callback, isolation_level, access_mode)
            .await
    }
}

/// Extension trait for easy wrapping of database connections.
pub trait LoggingExt {
    /// Wrap this connection with the default logger.
    fn with_default_logger(self) -> LoggedConnection;

    /// Wrap this connection with a custom logger.
    fn with_logger(self, logger: impl Logger + 'static) -> LoggedConnection;
}

impl LoggingExt for DatabaseConnection {
    fn with_default_logger(self) -> LoggedConnection {
        LoggedConnection::wrap(self)
    }

    fn with_logger(self, logger: impl Logger + 'static) -> LoggedConnection {
        LoggedConnection::new(self, logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::level::LogLevel;
    use sea_orm::{MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::fmt;
    use std::sync::Mutex;

    /// Collects finalized messages per level.
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<(LogLevel, String)>>>);

    struct SinkEvent {
        level: LogLevel,
        sink: Sink,
    }

    impl Event for SinkEvent {
        fn str(self: Box<Self>, _key: &str, _value: &str) -> Box<dyn Event> {
            self
        }

        fn msgf(self: Box<Self>, args: fmt::Arguments<'_>) {
            self.sink.0.lock().unwrap().push((self.level, args.to_string()));
        }
    }

    impl Sink {
        fn logger(&self, level: LogLevel) -> SeaOrmLogger {
            let (info, warn, error) = (self.clone(), self.clone(), self.clone());
            let mut logger = SeaOrmLogger::new()
                .with_info(move || {
                    Box::new(SinkEvent { level: LogLevel::Info, sink: info.clone() }) as Box<dyn Event>
                })
                .with_warn(move || {
                    Box::new(SinkEvent { level: LogLevel::Warn, sink: warn.clone() }) as Box<dyn Event>
                })
                .with_error(move || {
                    Box::new(SinkEvent { level: LogLevel::Error, sink: error.clone() }) as Box<dyn Event>
                });
            logger.log_mode(level);
            logger
        }

        fn messages(&self) -> Vec<(LogLevel, String)> {
            self.0.lock().unwrap().clone()
        }
    }

    fn row(id: i32) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("id", Value::from(id))])
    }

    #[tokio::test]
    async fn test_query_all_reports_row_count() {
        let sink = Sink::default();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row(1), row(2)]])
            .into_connection()
            .with_logger(sink.logger(LogLevel::Info));

        let stmt = Statement::from_string(DbBackend::Postgres, "SELECT id FROM users");
        let rows = db.query_all(stmt).await.unwrap();
        assert_eq!(rows.len(), 2);

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, LogLevel::Info);
        assert!(messages[0].1.contains("[rows:2] SELECT id FROM users"));
    }

    #[tokio::test]
    async fn test_execute_reports_rows_affected() {
        let sink = Sink::default();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection()
            .with_logger(sink.logger(LogLevel::Info));

        let result = db
            .execute_unprepared("UPDATE users SET active = true")
            .await
            .unwrap();
        assert_eq!(result.rows_affected(), 3);

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("[rows:3] UPDATE users SET active = true"));
    }

    #[tokio::test]
    async fn test_failed_query_logs_error_and_info() {
        let sink = Sink::default();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_errors([DbErr::Custom("disk full".into())])
            .into_connection()
            .with_logger(sink.logger(LogLevel::Info));

        let stmt = Statement::from_string(DbBackend::Postgres, "SELECT id FROM users");
        let err = db.query_all(stmt).await.unwrap_err();
        assert!(err.to_string().contains("disk full"));

        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].0, LogLevel::Error);
        assert!(messages[0].1.contains("disk full"));
        assert!(messages[0].1.contains("[rows:-]"));
        assert_eq!(messages[1].0, LogLevel::Info);
    }

    #[tokio::test]
    async fn test_error_level_hides_successful_queries() {
        let sink = Sink::default();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row(1)]])
            .into_connection()
            .with_logger(sink.logger(LogLevel::Error));

        let stmt = Statement::from_string(DbBackend::Postgres, "SELECT id FROM users LIMIT 1");
        let found = db.query_one(stmt).await.unwrap();
        assert!(found.is_some());
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_wrap_uses_default_logger() {
        let db = MockDatabase::new(DbBackend::Sqlite).into_connection();
        let logged = LoggedConnection::from(db);
        assert!(logged.is_mock_connection());
        assert_eq!(logged.get_database_backend(), DbBackend::Sqlite);
    }
}
