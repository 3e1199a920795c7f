//! Data models for the PostgreSQL MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;

pub use connection::{
    ConnectionConfig, ConnectionSource, ConnectionSummary, DEFAULT_DATABASE, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_USER, TlsMode,
};
