//! Connection-related data models.
//!
//! This module defines the PostgreSQL connection configuration and the parser
//! that builds it from a `postgres://` connection descriptor.

use crate::error::{DbError, DbResult};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_DATABASE: &str = "postgres";

const SUPPORTED_SCHEMES: &[&str] = &["postgres", "postgresql"];

/// TLS policy for a connection.
///
/// Only `sslmode=require` and `sslmode=verify-full` turn TLS on. Every other
/// value, including `prefer` and `allow`, leaves it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TlsMode {
    #[default]
    #[serde(rename = "off")]
    Disable,
    /// TLS without peer certificate verification
    #[serde(rename = "require-unverified")]
    Require,
    /// TLS with full peer verification
    #[serde(rename = "require-verified")]
    VerifyFull,
}

impl TlsMode {
    /// Map an `sslmode` query value to a TLS policy.
    pub fn from_sslmode(value: Option<&str>) -> Self {
        match value {
            Some("require") => Self::Require,
            Some("verify-full") => Self::VerifyFull,
            _ => Self::Disable,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disable)
    }
}

impl std::fmt::Display for TlsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disable => write!(f, "off"),
            Self::Require => write!(f, "require-unverified"),
            Self::VerifyFull => write!(f, "require-verified"),
        }
    }
}

/// Where the connection currently in force came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionSource {
    /// Startup configuration (DB_* environment variables)
    Environment,
    /// Installed by the `connect` tool
    Runtime,
}

impl std::fmt::Display for ConnectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// Configuration for a PostgreSQL connection.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Contains sensitive data - never log
    pub password: String,
    pub database: String,
    pub tls_mode: TlsMode,
}

impl ConnectionConfig {
    /// Create a configuration from already-validated parts.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        tls_mode: TlsMode,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            tls_mode,
        }
    }

    /// Parse a connection descriptor.
    ///
    /// # Format
    ///
    /// ```text
    /// postgres(ql)://[user[:password]@]host[:port][/database][?sslmode=...]
    /// ```
    ///
    /// Missing parts fall back to `localhost`, `5432`, user `postgres`, an
    /// empty password and database `postgres`. A port that is `0`, non-numeric
    /// or out of range is treated as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use postgres_mcp_server::models::{ConnectionConfig, TlsMode};
    ///
    /// let config = ConnectionConfig::parse("postgres://u:p@h:1234/d?sslmode=verify-full").unwrap();
    /// assert_eq!(config.host, "h");
    /// assert_eq!(config.port, 1234);
    /// assert_eq!(config.tls_mode, TlsMode::VerifyFull);
    ///
    /// assert!(ConnectionConfig::parse("mysql://h/d").is_err());
    /// ```
    pub fn parse(s: &str) -> DbResult<Self> {
        let s = s.trim();
        let url = match Url::parse(s) {
            Err(url::ParseError::InvalidPort) => strip_port(s).and_then(|s| Url::parse(&s).ok()),
            parsed => parsed.ok(),
        }
        .ok_or_else(|| {
            DbError::invalid_connection_string("could not parse as a postgres:// URL")
        })?;

        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(DbError::invalid_connection_string(
                "must start with postgres:// or postgresql://",
            ));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_HOST)
            .to_string();

        let user = percent_decode(url.username());
        let password = url.password().map(percent_decode).unwrap_or_default();
        let database = url.path().strip_prefix('/').unwrap_or(url.path());

        let sslmode = url
            .query_pairs()
            .find(|(k, _)| k == "sslmode")
            .map(|(_, v)| v.into_owned());

        Ok(Self {
            host,
            port: url.port().filter(|&p| p != 0).unwrap_or(DEFAULT_PORT),
            user: non_empty_or(user, DEFAULT_USER),
            password,
            database: non_empty_or(database.to_string(), DEFAULT_DATABASE),
            tls_mode: TlsMode::from_sslmode(sslmode.as_deref()),
        })
    }

    /// Non-secret view of this configuration.
    pub fn summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            ssl: self.tls_mode.is_enabled(),
        }
    }

    /// Display-safe descriptor (password masked).
    pub fn masked_connection_string(&self) -> String {
        let credentials = if self.password.is_empty() {
            self.user.clone()
        } else {
            format!("{}:****", self.user)
        };
        format!(
            "postgres://{}@{}:{}/{}",
            credentials, self.host, self.port, self.database
        )
    }
}

impl FromStr for ConnectionConfig {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOST,
            DEFAULT_PORT,
            DEFAULT_USER,
            "",
            DEFAULT_DATABASE,
            TlsMode::Disable,
        )
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .field("database", &self.database)
            .field("tls_mode", &self.tls_mode)
            .finish()
    }
}

/// Connection information safe to hand back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub ssl: bool,
}

/// Remove the `:port` suffix from the authority of `s`, if any.
fn strip_port(s: &str) -> Option<String> {
    let (scheme, rest) = s.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(end);
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host_port = &authority[host_start..];
    // Skip past a bracketed IPv6 literal before looking for the port separator.
    let search_from = host_port.rfind(']').map_or(0, |i| i + 1);
    let colon = host_port[search_from..].rfind(':')? + search_from;
    Some(format!(
        "{}://{}{}{}",
        scheme,
        &authority[..host_start],
        &host_port[..colon],
        tail
    ))
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Percent-decode a user-info component, keeping malformed escapes verbatim.
fn percent_decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_descriptor() {
        let config = ConnectionConfig::parse("postgres://u:p@h:1234/d?sslmode=verify-full").unwrap();
        assert_eq!(
            config,
            ConnectionConfig::new("h", 1234, "u", "p", "d", TlsMode::VerifyFull)
        );
    }

    #[test]
    fn test_parse_minimal_descriptor() {
        let config = ConnectionConfig::parse("postgresql://host/db").unwrap();
        assert_eq!(
            config,
            ConnectionConfig::new("host", 5432, "postgres", "", "db", TlsMode::Disable)
        );
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        for s in ["mysql://h/d", "sqlite://path/to.db", "http://h/d"] {
            let err = ConnectionConfig::parse(s).unwrap_err();
            assert!(
                matches!(err, DbError::InvalidConnectionString { .. }),
                "{} should be rejected, got {:?}",
                s,
                err
            );
        }
    }

    #[test]
    fn test_parse_rejects_non_url() {
        let err = ConnectionConfig::parse("not a connection string").unwrap_err();
        assert!(matches!(err, DbError::InvalidConnectionString { .. }));
    }

    #[test]
    fn test_parse_defaults_database_when_path_empty() {
        let config = ConnectionConfig::parse("postgres://host").unwrap();
        assert_eq!(config.database, "postgres");
        let config = ConnectionConfig::parse("postgres://host/").unwrap();
        assert_eq!(config.database, "postgres");
    }

    #[test]
    fn test_parse_port_edge_cases() {
        for s in [
            "postgres://h:0/d",
            "postgres://h:abc/d",
            "postgres://h:70000/d",
            "postgres://u:p@h:/d",
        ] {
            let config = ConnectionConfig::parse(s).unwrap();
            assert_eq!(config.port, DEFAULT_PORT, "{}", s);
            assert_eq!(config.host, "h", "{}", s);
            assert_eq!(config.database, "d", "{}", s);
        }
    }

    #[test]
    fn test_strip_port_keeps_credentials_and_path() {
        assert_eq!(
            strip_port("postgres://u:p@h:abc/d?sslmode=require").as_deref(),
            Some("postgres://u:p@h/d?sslmode=require")
        );
        assert_eq!(
            strip_port("postgres://[::1]:x/d").as_deref(),
            Some("postgres://[::1]/d")
        );
        assert_eq!(strip_port("postgres://h/d"), None);
    }

    #[test]
    fn test_parse_percent_decodes_credentials() {
        let config = ConnectionConfig::parse("postgres://us%40er:p%3Ass%2Fw0rd@h/d").unwrap();
        assert_eq!(config.user, "us@er");
        assert_eq!(config.password, "p:ss/w0rd");
    }

    #[test]
    fn test_parse_keeps_plus_in_password() {
        let config = ConnectionConfig::parse("postgres://u:a+b@h/d").unwrap();
        assert_eq!(config.password, "a+b");
    }

    #[test]
    fn test_parse_keeps_sub_delimiters_in_credentials() {
        let config = ConnectionConfig::parse("postgres://u:a&b=c@h/d").unwrap();
        assert_eq!(config.user, "u");
        assert_eq!(config.password, "a&b=c");

        let config = ConnectionConfig::parse("postgres://us&er=x:p%26w=1&2@h/d").unwrap();
        assert_eq!(config.user, "us&er=x");
        assert_eq!(config.password, "p&w=1&2");
        assert_eq!(config.host, "h");
        assert_eq!(config.database, "d");
    }

    #[test]
    fn test_parse_keeps_malformed_escapes() {
        let config = ConnectionConfig::parse("postgres://u%zz:100%@h/d").unwrap();
        assert_eq!(config.user, "u%zz");
        assert_eq!(config.password, "100%");
    }

    #[test]
    fn test_parse_password_without_user_defaults_user() {
        let config = ConnectionConfig::parse("postgres://:secret@h/d").unwrap();
        assert_eq!(config.user, "postgres");
        assert_eq!(config.password, "secret");
    }

    #[test]
    fn test_sslmode_mapping() {
        let cases = [
            ("?sslmode=require", TlsMode::Require),
            ("?sslmode=verify-full", TlsMode::VerifyFull),
            ("?sslmode=prefer", TlsMode::Disable),
            ("?sslmode=allow", TlsMode::Disable),
            ("?sslmode=verify-ca", TlsMode::Disable),
            ("?sslmode=disable", TlsMode::Disable),
            ("", TlsMode::Disable),
        ];
        for (query, expected) in cases {
            let config = ConnectionConfig::parse(&format!("postgres://h/d{}", query)).unwrap();
            assert_eq!(config.tls_mode, expected, "query: {:?}", query);
        }
    }

    #[test]
    fn test_summary_hides_password() {
        let config = ConnectionConfig::parse("postgres://u:secret@h:6543/d?sslmode=require").unwrap();
        let summary = config.summary();
        assert_eq!(summary.port, 6543);
        assert!(summary.ssl);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_debug_and_masked_string_hide_password() {
        let config = ConnectionConfig::parse("postgres://u:secret@h/d").unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
        let masked = config.masked_connection_string();
        assert!(!masked.contains("secret"));
        assert!(masked.contains("****"));
    }

    #[test]
    fn test_tls_mode_serialization() {
        assert_eq!(serde_json::to_string(&TlsMode::Disable).unwrap(), "\"off\"");
        assert_eq!(
            serde_json::to_string(&TlsMode::VerifyFull).unwrap(),
            "\"require-verified\""
        );
        assert_eq!(TlsMode::Require.to_string(), "require-unverified");
    }
}
