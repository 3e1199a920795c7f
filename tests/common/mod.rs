//! Shared test helpers: a counting in-memory connection factory.

#![allow(dead_code)]

use postgres_mcp_server::db::{ConnectionFactory, DbConnection, JsonRow};
use postgres_mcp_server::error::{DbError, DbResult};
use postgres_mcp_server::models::ConnectionConfig;
use rmcp::model::{CallToolResult, JsonObject};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Observable state shared by a fake factory and the connections it opens.
#[derive(Default)]
pub struct FakeState {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub fail_open: AtomicBool,
    pub fail_query: AtomicBool,
    pub hang_query: AtomicBool,
    pub fail_close: AtomicBool,
    pub opened: Mutex<Vec<ConnectionConfig>>,
    pub executed: Mutex<Vec<String>>,
    pub rows: Mutex<Vec<JsonRow>>,
}

impl FakeState {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn last_opened(&self) -> Option<ConnectionConfig> {
        self.opened.lock().unwrap().last().cloned()
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn set_rows(&self, rows: serde_json::Value) {
        let rows = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect();
        *self.rows.lock().unwrap() = rows;
    }
}

#[derive(Clone, Default)]
pub struct FakeFactory {
    pub state: Arc<FakeState>,
}

impl FakeFactory {
    pub fn new() -> (Self, Arc<FakeState>) {
        let factory = Self::default();
        let state = Arc::clone(&factory.state);
        (factory, state)
    }
}

impl ConnectionFactory for FakeFactory {
    type Connection = FakeConnection;

    async fn open(&self, config: &ConnectionConfig) -> DbResult<FakeConnection> {
        if self.state.fail_open.load(Ordering::SeqCst) {
            return Err(DbError::connection(
                format!("connect ECONNREFUSED {}:{}", config.host, config.port),
                "Check that the PostgreSQL server is running and accessible",
            ));
        }
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        self.state.opened.lock().unwrap().push(config.clone());
        Ok(FakeConnection {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct FakeConnection {
    state: Arc<FakeState>,
}

impl DbConnection for FakeConnection {
    async fn fetch_rows(&mut self, sql: &str) -> DbResult<Vec<JsonRow>> {
        self.state.executed.lock().unwrap().push(sql.to_string());
        if self.state.hang_query.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.state.fail_query.load(Ordering::SeqCst) {
            return Err(DbError::database(
                "relation \"missing\" does not exist",
                Some("42P01".to_string()),
                "Check the SQL syntax and referenced objects",
            ));
        }
        Ok(self.state.rows.lock().unwrap().clone())
    }

    async fn close(self) -> DbResult<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(DbError::connection(
                "Connection terminated unexpectedly",
                "Check that the PostgreSQL server is running and accessible",
            ));
        }
        Ok(())
    }
}

/// Build a tool arguments object from a JSON literal.
pub fn args(value: serde_json::Value) -> Option<JsonObject> {
    value.as_object().cloned()
}

/// Text of the first content item.
pub fn text(result: &CallToolResult) -> String {
    result.content[0]
        .raw
        .as_text()
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error.unwrap_or(false)
}
