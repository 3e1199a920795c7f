//! Connection factory seam.
//!
//! Handlers never talk to a driver directly. They ask a `ConnectionFactory`
//! for a transient connection, run one statement on it, and close it.

use crate::error::DbResult;
use crate::models::ConnectionConfig;
use serde_json::Value as JsonValue;
use std::future::Future;

/// A result row keyed by column name.
pub type JsonRow = serde_json::Map<String, JsonValue>;

/// Opens live database connections from a configuration.
pub trait ConnectionFactory: Send + Sync + 'static {
    type Connection: DbConnection;

    /// Open and authenticate a new connection.
    fn open(
        &self,
        config: &ConnectionConfig,
    ) -> impl Future<Output = DbResult<Self::Connection>> + Send;
}

/// A single open database connection.
///
/// `close` consumes the connection, so it can run at most once.
pub trait DbConnection: Send {
    /// Execute a statement and return its rows.
    fn fetch_rows(&mut self, sql: &str) -> impl Future<Output = DbResult<Vec<JsonRow>>> + Send;

    /// Terminate the connection.
    fn close(self) -> impl Future<Output = DbResult<()>> + Send;
}
