//! PostgreSQL MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to run read-only queries against PostgreSQL, with runtime connection switching.

use postgres_mcp_server::config::{Config, TransportMode};
use postgres_mcp_server::db::{PgConnectionFactory, Session};
use postgres_mcp_server::mcp::{GatewayOptions, GatewayService};
use postgres_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries the MCP protocol in stdio mode.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse_args();

    if config.enable_logs {
        init_tracing(&config);
    }

    let default_connection = config.default_connection();
    info!(
        transport = %config.transport,
        connection = %default_connection.masked_connection_string(),
        tls = %default_connection.tls_mode,
        runtime_connect = config.runtime_connect(),
        "Starting PostgreSQL MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let session = Arc::new(Session::new(default_connection));
    let options = GatewayOptions {
        runtime_connect: config.runtime_connect(),
        query_timeout: config.query_timeout_duration(),
    };
    let service = GatewayService::new(session, PgConnectionFactory::new(), options);

    let result = match config.transport {
        TransportMode::Stdio => StdioTransport::new(service).run().await,
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(
                service,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            )
            .run()
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        eprintln!("Fatal error in main(): {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
