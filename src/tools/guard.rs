//! Read-only guard for the query tool.
//!
//! This is a lexical prefix check, not a SQL parser. A statement is rejected
//! when, after trimming and lower-casing, it begins with one of a fixed list of
//! write or DDL keywords. Everything else is accepted.
//!
//! # Known blind spots
//!
//! The guard is a best-effort filter and does not enforce read-only access.
//! The following pass unchallenged and rely on database permissions instead:
//!
//! - data-modifying CTEs (`WITH d AS (DELETE FROM t RETURNING *) SELECT * FROM d`)
//! - multi-statement batches (`SELECT 1; DROP TABLE t`)
//! - procedure and function calls (`CALL purge()`, `SELECT purge()`)
//! - leading comments (`/* */ DELETE FROM t`)
//! - other write statements outside the list (`COPY`, `VACUUM`, `REINDEX`, ...)

/// Statement-leading keywords that mark a query as a write.
pub const DENIED_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "create", "truncate", "grant", "revoke",
];

/// Message returned to the client when the guard rejects a statement.
pub const REJECTION_MESSAGE: &str = "Error: Only SELECT queries are allowed for security reasons.";

/// Outcome of classifying a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryClass {
    ReadOnly,
    /// Starts with the contained denied keyword
    Write(&'static str),
}

impl QueryClass {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

/// Classify a statement by its leading keyword.
///
/// # Examples
///
/// ```
/// use postgres_mcp_server::tools::guard::{classify, QueryClass};
///
/// assert_eq!(classify("  SELECT 1"), QueryClass::ReadOnly);
/// assert_eq!(classify("Drop table users"), QueryClass::Write("drop"));
/// ```
pub fn classify(sql: &str) -> QueryClass {
    let normalized = sql.trim().to_lowercase();
    DENIED_KEYWORDS
        .iter()
        .find(|kw| normalized.starts_with(**kw))
        .map_or(QueryClass::ReadOnly, |kw| QueryClass::Write(kw))
}

/// Whether the statement passes the read-only guard.
pub fn is_read_only(sql: &str) -> bool {
    classify(sql).is_read_only()
}
