//! MCP service implementation using rmcp.
//!
//! This module defines the GatewayService struct that exposes the connect,
//! disconnect and query tools over the MCP protocol. Tools are listed and
//! routed by hand so that unknown tool names surface as `METHOD_NOT_FOUND`.

use crate::db::{ConnectionFactory, PgConnectionFactory, Session};
use crate::mcp::dispatcher::{GatewayOptions, ToolDispatcher};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
};
use std::future::Future;
use std::sync::Arc;

pub struct GatewayService<F = PgConnectionFactory> {
    dispatcher: Arc<ToolDispatcher<F>>,
}

impl<F> Clone for GatewayService<F> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<F: ConnectionFactory> GatewayService<F> {
    /// Create a new GatewayService instance.
    ///
    /// # Arguments
    ///
    /// * `session` - Shared session holding the default and active connection
    /// * `factory` - Opens the transient connection used by each call
    /// * `options` - Runtime switching capability and optional deadline
    pub fn new(session: Arc<Session>, factory: F, options: GatewayOptions) -> Self {
        Self {
            dispatcher: Arc::new(ToolDispatcher::new(session, Arc::new(factory), options)),
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher<F> {
        &self.dispatcher
    }

    fn instructions(&self) -> String {
        if self.dispatcher.options().runtime_connect {
            "Read-only access to a PostgreSQL database.\n\
            \n\
            ## Workflow\n\
            1. Optionally call `connect` with a postgres:// connection string to switch databases\n\
            2. Call `query` with a SELECT statement; pass `connectionString` to target another database for one call only\n\
            3. Call `disconnect` to return to the default connection\n\
            \n\
            Statements starting with INSERT, UPDATE, DELETE, DROP, ALTER, CREATE, TRUNCATE, GRANT or REVOKE are refused."
                .to_string()
        } else {
            "Read-only access to a PostgreSQL database.\n\
            \n\
            Call `query` with a SELECT statement. Statements starting with INSERT, UPDATE, DELETE, DROP, ALTER, CREATE, TRUNCATE, GRANT or REVOKE are refused."
                .to_string()
        }
    }
}

impl<F: ConnectionFactory> ServerHandler for GatewayService<F> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "postgres-mcp-server".to_owned(),
                title: Some("PostgreSQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(self.instructions()),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.dispatcher.tools();
        async move { Ok(ListToolsResult::with_all_items(tools)) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            self.dispatcher
                .dispatch(&request.name, request.arguments)
                .await
                .map_err(McpError::from)
        }
    }
}
