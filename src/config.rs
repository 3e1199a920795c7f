//! Configuration handling for the PostgreSQL MCP Server.
//!
//! This module provides configuration management via CLI arguments and environment variables.
//! The default database connection comes from the `DB_*` variables; server behavior is
//! tuned with the `MCP_*` variables.

use crate::models::{
    ConnectionConfig, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_USER, TlsMode,
};
use clap::{Parser, ValueEnum};
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with Server-Sent Events (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the PostgreSQL MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "postgres-mcp-server",
    about = "MCP server for PostgreSQL - read-only queries with runtime connection switching",
    version,
    author
)]
pub struct Config {
    /// Default database host
    #[arg(long = "db-host", default_value = DEFAULT_HOST, env = "DB_HOST")]
    pub db_host: String,

    /// Default database port
    #[arg(long = "db-port", default_value_t = DEFAULT_PORT, env = "DB_PORT")]
    pub db_port: u16,

    /// Default database name
    #[arg(long = "db-database", default_value = DEFAULT_DATABASE, env = "DB_DATABASE")]
    pub db_database: String,

    /// Default database user
    #[arg(long = "db-username", default_value = DEFAULT_USER, env = "DB_USERNAME")]
    pub db_username: String,

    /// Default database password (sensitive - not logged)
    #[arg(
        long = "db-password",
        default_value = "",
        env = "DB_PASSWORD",
        hide_env_values = true
    )]
    pub db_password: String,

    /// "true" enables TLS without certificate verification for the default connection
    #[arg(long = "db-ssl", default_value = "false", env = "DB_SSL")]
    pub db_ssl: String,

    /// Disable the connect/disconnect tools and per-query connection overrides
    #[arg(long, env = "MCP_NO_RUNTIME_CONNECT")]
    pub no_runtime_connect: bool,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Deadline in seconds for opening a connection and running a query. Unbounded when unset.
    #[arg(long, env = "MCP_QUERY_TIMEOUT")]
    pub query_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output on stderr
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            db_host: DEFAULT_HOST.to_string(),
            db_port: DEFAULT_PORT,
            db_database: DEFAULT_DATABASE.to_string(),
            db_username: DEFAULT_USER.to_string(),
            db_password: String::new(),
            db_ssl: "false".to_string(),
            no_runtime_connect: false,
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            query_timeout: None,
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    /// Build the default connection from the `DB_*` settings.
    ///
    /// Only the exact value `"true"` for `DB_SSL` enables TLS.
    pub fn default_connection(&self) -> ConnectionConfig {
        let tls_mode = if self.db_ssl == "true" {
            TlsMode::Require
        } else {
            TlsMode::Disable
        };
        ConnectionConfig::new(
            &self.db_host,
            self.db_port,
            &self.db_username,
            &self.db_password,
            &self.db_database,
            tls_mode,
        )
    }

    /// Whether connect/disconnect and per-query overrides are offered.
    pub fn runtime_connect(&self) -> bool {
        !self.no_runtime_connect
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Get the query timeout as a Duration, if one is configured.
    pub fn query_timeout_duration(&self) -> Option<Duration> {
        self.query_timeout.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
