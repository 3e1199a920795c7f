//! Database access layer.
//!
//! This module provides database access functionality:
//! - Session state (default and active connection)
//! - The connection factory seam and its PostgreSQL implementation
//! - Type mappings from PostgreSQL rows to JSON

pub mod factory;
pub mod postgres;
pub mod session;
pub mod types;

pub use factory::{ConnectionFactory, DbConnection, JsonRow};
pub use postgres::{PgConnectionFactory, PgSession};
pub use session::Session;
