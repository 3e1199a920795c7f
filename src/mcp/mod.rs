//! MCP server integration module.
//!
//! This module provides the integration between the MCP protocol and
//! the gateway tool handlers using the rmcp framework.

pub mod dispatcher;
pub mod service;

pub use dispatcher::{GatewayOptions, ToolDispatcher};
pub use service::GatewayService;
