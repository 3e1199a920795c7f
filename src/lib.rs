//! PostgreSQL MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools that give AI
//! assistants read-only query access to PostgreSQL, with the ability to switch
//! the active database at runtime and revert to a configured default.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::DbError;
pub use mcp::{GatewayOptions, GatewayService};
