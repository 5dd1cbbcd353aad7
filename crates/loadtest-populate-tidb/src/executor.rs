//! Statement execution against TiDB.

use crate::error::TidbPopulatorError;
use mysql_async::prelude::Queryable;
use std::borrow::Cow;
use std::time::Duration;
use tracing::info;

/// Statements longer than this many bytes are truncated when logged.
pub const LOG_STATEMENT_LIMIT: usize = 30;

/// Something that can run a single SQL statement and discard its result.
#[async_trait::async_trait]
pub trait SqlExecutor: Send {
    /// Execute one statement, blocking until the server has finished it.
    async fn execute(&mut self, sql: &str) -> Result<(), TidbPopulatorError>;
}

#[async_trait::async_trait]
impl SqlExecutor for mysql_async::Conn {
    async fn execute(&mut self, sql: &str) -> Result<(), TidbPopulatorError> {
        // Text protocol: values are already interpolated into the statement.
        self.query_drop(sql).await?;
        Ok(())
    }
}

/// Logs every statement before handing it to the wrapped executor and
/// bounds its execution time.
pub struct LoggedExecutor<E> {
    inner: E,
    timeout: Duration,
}

impl<E: SqlExecutor> LoggedExecutor<E> {
    pub fn new(inner: E, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

#[async_trait::async_trait]
impl<E: SqlExecutor> SqlExecutor for LoggedExecutor<E> {
    async fn execute(&mut self, sql: &str) -> Result<(), TidbPopulatorError> {
        info!("{}", truncate_statement(sql));
        match tokio::time::timeout(self.timeout, self.inner.execute(sql)).await {
            Ok(result) => result,
            Err(_) => Err(TidbPopulatorError::Timeout {
                statement: truncate_statement(sql).into_owned(),
                timeout: self.timeout,
            }),
        }
    }
}

/// Shorten a statement for logging: the first [`LOG_STATEMENT_LIMIT`] bytes
/// followed by `...`, or the statement itself when it is short enough.
pub fn truncate_statement(sql: &str) -> Cow<'_, str> {
    if sql.len() <= LOG_STATEMENT_LIMIT {
        return Cow::Borrowed(sql);
    }
    let mut end = LOG_STATEMENT_LIMIT;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &sql[..end]))
}

/// Records statements instead of sending them anywhere.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    pub statements: Vec<String>,
    /// Fail the statement at this zero-based position.
    pub fail_at: Option<usize>,
    /// Sleep this long before recording each statement.
    pub delay: Option<Duration>,
}

#[cfg(test)]
#[async_trait::async_trait]
impl SqlExecutor for RecordingExecutor {
    async fn execute(&mut self, sql: &str) -> Result<(), TidbPopulatorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_at == Some(self.statements.len()) {
            return Err(TidbPopulatorError::Timeout {
                statement: sql.to_string(),
                timeout: Duration::ZERO,
            });
        }
        self.statements.push(sql.to_string());
        Ok(())
    }
}
