//! Query execution tool.
//!
//! This module implements the `query` MCP tool. Statements are screened by the
//! read-only guard, run on a transient connection, and the connection is closed
//! on every path once it has been opened.

use crate::db::{ConnectionFactory, DbConnection, JsonRow, Session};
use crate::error::{DbError, DbResult};
use crate::models::ConnectionConfig;
use crate::tools::guard::{self, QueryClass};
use crate::tools::with_deadline;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Input for the query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryInput {
    /// SQL query to execute (read-only)
    pub sql: String,
    /// Optional: PostgreSQL connection string to override the current connection for this query only
    #[serde(rename = "connectionString", default)]
    pub connection_string: Option<String>,
}

/// Input for the query tool when runtime connection overrides are disabled.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FixedQueryInput {
    /// SQL query to execute (read-only)
    pub sql: String,
}

/// Tool handler for read-only queries.
pub struct QueryToolHandler<F> {
    session: Arc<Session>,
    factory: Arc<F>,
    deadline: Option<Duration>,
    allow_override: bool,
}

impl<F: ConnectionFactory> QueryToolHandler<F> {
    pub fn new(session: Arc<Session>, factory: Arc<F>, deadline: Option<Duration>) -> Self {
        Self {
            session,
            factory,
            deadline,
            allow_override: true,
        }
    }

    /// Refuse per-call `connectionString` overrides.
    pub fn without_overrides(mut self) -> Self {
        self.allow_override = false;
        self
    }

    /// Handle the query tool call.
    ///
    /// The session is never modified, even when an override is supplied.
    pub async fn query(&self, input: QueryInput) -> DbResult<Vec<JsonRow>> {
        if let QueryClass::Write(keyword) = guard::classify(&input.sql) {
            warn!(keyword, "Rejected write statement");
            return Err(DbError::query_rejected(keyword));
        }

        let config = self.effective_config(input.connection_string.as_deref()).await?;

        let mut conn = with_deadline(self.deadline, "connect", self.factory.open(&config))
            .await
            .map_err(|e| match e {
                DbError::Connection {
                    message,
                    suggestion,
                } => DbError::connection(
                    format!("Failed to connect to PostgreSQL: {}", message),
                    suggestion,
                ),
                other => other,
            })?;

        let result = with_deadline(self.deadline, "query", conn.fetch_rows(&input.sql)).await;

        if let Err(e) = with_deadline(self.deadline, "close", conn.close()).await {
            warn!(error = %e, "Failed to close connection");
        }

        let rows = result?;
        info!(row_count = rows.len(), "Query executed");
        Ok(rows)
    }

    /// An empty override counts as absent.
    async fn effective_config(&self, override_string: Option<&str>) -> DbResult<Arc<ConnectionConfig>> {
        match override_string.filter(|s| !s.is_empty()) {
            Some(_) if !self.allow_override => Err(DbError::connection(
                "Runtime connection overrides are disabled",
                "Omit connectionString to use the configured connection",
            )),
            Some(s) => Ok(Arc::new(ConnectionConfig::parse(s)?)),
            None => Ok(self.session.current().await),
        }
    }
}
