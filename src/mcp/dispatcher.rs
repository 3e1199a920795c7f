//! Tool dispatch.
//!
//! Routes a tool name plus JSON arguments to the connect, disconnect and query
//! handlers and frames every outcome as a `CallToolResult`. Handler failures
//! become `isError` results; only unknown tools and malformed arguments are
//! returned as `Err` so they reach the client as protocol errors.

use crate::db::{ConnectionFactory, Session};
use crate::error::{DbError, DbResult};
use crate::tools::connect::{ConnectInput, ConnectionToolHandler};
use crate::tools::guard::REJECTION_MESSAGE;
use crate::tools::query::{FixedQueryInput, QueryInput, QueryToolHandler};
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const CONNECT_TOOL: &str = "connect";
pub const DISCONNECT_TOOL: &str = "disconnect";
pub const QUERY_TOOL: &str = "query";

const CONNECT_DESCRIPTION: &str = "Connect to a PostgreSQL database using a connection string. The connection will be used for subsequent queries until changed.";
const DISCONNECT_DESCRIPTION: &str = "Disconnect from the current runtime database and revert to the default environment-configured connection";
const QUERY_DESCRIPTION: &str =
    "Run a read-only SQL query against the currently connected database";

/// Construction-time switches for the gateway.
#[derive(Debug, Clone, Copy)]
pub struct GatewayOptions {
    /// Offer connect/disconnect and per-query `connectionString` overrides
    pub runtime_connect: bool,
    /// Bound on opening a connection and on running a statement; `None` waits forever
    pub query_timeout: Option<Duration>,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            runtime_connect: true,
            query_timeout: None,
        }
    }
}

/// Routes tool calls to their handlers.
pub struct ToolDispatcher<F> {
    session: Arc<Session>,
    connection: ConnectionToolHandler<F>,
    query: QueryToolHandler<F>,
    options: GatewayOptions,
}

impl<F: ConnectionFactory> ToolDispatcher<F> {
    pub fn new(session: Arc<Session>, factory: Arc<F>, options: GatewayOptions) -> Self {
        let connection = ConnectionToolHandler::new(
            Arc::clone(&session),
            Arc::clone(&factory),
            options.query_timeout,
        );
        let query = QueryToolHandler::new(Arc::clone(&session), factory, options.query_timeout);
        let query = if options.runtime_connect {
            query
        } else {
            query.without_overrides()
        };

        Self {
            session,
            connection,
            query,
            options,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn options(&self) -> GatewayOptions {
        self.options
    }

    /// Tools advertised to clients, in a stable order.
    pub fn tools(&self) -> Vec<Tool> {
        if self.options.runtime_connect {
            vec![
                Tool::new(CONNECT_TOOL, CONNECT_DESCRIPTION, input_schema::<ConnectInput>()),
                Tool::new(DISCONNECT_TOOL, DISCONNECT_DESCRIPTION, empty_schema()),
                Tool::new(QUERY_TOOL, QUERY_DESCRIPTION, input_schema::<QueryInput>()),
            ]
        } else {
            vec![Tool::new(
                QUERY_TOOL,
                QUERY_DESCRIPTION,
                input_schema::<FixedQueryInput>(),
            )]
        }
    }

    /// Run the named tool.
    ///
    /// # Errors
    ///
    /// `UnknownOperation` for names that are not offered and `InvalidInput`
    /// for arguments that do not match the tool's input shape. Every other
    /// failure is reported inside the returned `CallToolResult`.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> DbResult<CallToolResult> {
        debug!(tool = name, "Dispatching tool call");
        let runtime_connect = self.options.runtime_connect;

        match name {
            CONNECT_TOOL if runtime_connect => {
                let input: ConnectInput = parse_arguments(arguments)?;
                match self.connection.connect(input).await {
                    Ok(output) => json_result(&output),
                    Err(e) => Ok(error_result(format!("Connection failed: {}", e))),
                }
            }
            DISCONNECT_TOOL if runtime_connect => json_result(&self.connection.disconnect().await),
            QUERY_TOOL => {
                let input: QueryInput = parse_arguments(arguments)?;
                match self.query.query(input).await {
                    Ok(rows) => json_result(&rows),
                    Err(DbError::QueryRejected { .. }) => Ok(error_result(REJECTION_MESSAGE)),
                    Err(e) => {
                        warn!(error = %e, sql_state = ?e.sql_state(), "Query failed");
                        Ok(error_result(format!("PostgreSQL Error: {}", e)))
                    }
                }
            }
            _ => Err(DbError::unknown_operation(name)),
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Option<JsonObject>) -> DbResult<T> {
    serde_json::from_value(JsonValue::Object(arguments.unwrap_or_default()))
        .map_err(|e| DbError::invalid_input(e.to_string()))
}

fn json_result<T: Serialize>(value: &T) -> DbResult<CallToolResult> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| DbError::internal(format!("Failed to serialize result: {}", e)))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

fn input_schema<T: schemars::JsonSchema>() -> Arc<JsonObject> {
    let schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
    match schema {
        JsonValue::Object(map) => Arc::new(map),
        _ => empty_schema(),
    }
}

fn empty_schema() -> Arc<JsonObject> {
    let mut map = JsonObject::new();
    map.insert("type".to_string(), JsonValue::String("object".to_string()));
    map.insert("properties".to_string(), JsonValue::Object(JsonObject::new()));
    Arc::new(map)
}
