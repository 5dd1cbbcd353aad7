//! Error types for the TiDB populator.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during TiDB population.
#[derive(Error, Debug)]
pub enum TidbPopulatorError {
    /// MySQL protocol or query error.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// Statement did not complete within the read timeout.
    #[error("statement `{statement}` timed out after {timeout:?}")]
    Timeout {
        statement: String,
        timeout: Duration,
    },
}
