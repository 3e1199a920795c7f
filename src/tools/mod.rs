//! MCP tool implementations.
//!
//! This module contains the gateway tool handlers:
//! - `connect`: Switch the active connection after a probe
//! - `disconnect`: Revert to the default connection
//! - `query`: Run a read-only statement
//! - `guard`: Lexical read-only check used by `query`

pub mod connect;
pub mod guard;
pub mod query;

pub use connect::{ConnectInput, ConnectOutput, ConnectionToolHandler, DisconnectOutput};
pub use guard::{QueryClass, classify, is_read_only};
pub use query::{FixedQueryInput, QueryInput, QueryToolHandler};

use crate::error::{DbError, DbResult};
use std::future::Future;
use std::time::Duration;

/// Await `fut`, bounded by `deadline` when one is set.
pub(crate) async fn with_deadline<T>(
    deadline: Option<Duration>,
    operation: &str,
    fut: impl Future<Output = DbResult<T>>,
) -> DbResult<T> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DbError::timeout(operation, limit))?,
        None => fut.await,
    }
}
