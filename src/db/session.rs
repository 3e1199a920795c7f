//! Session state.
//!
//! The session holds the default connection configuration (from the `DB_*`
//! environment) and the configuration currently in force. Only the `connect`
//! and `disconnect` tools change it; nothing is persisted.

use crate::models::{ConnectionConfig, ConnectionSource};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::info;

#[derive(Debug, Clone)]
struct ActiveConnection {
    config: Arc<ConnectionConfig>,
    source: ConnectionSource,
}

/// The process-wide connection session, shared as `Arc<Session>`.
#[derive(Debug)]
pub struct Session {
    default: Arc<ConnectionConfig>,
    active: RwLock<ActiveConnection>,
    /// Serializes connect/disconnect across parse, probe and commit
    switch_lock: Mutex<()>,
}

impl Session {
    /// Create a session whose active configuration is the default.
    pub fn new(default: ConnectionConfig) -> Self {
        let default = Arc::new(default);
        Self {
            active: RwLock::new(ActiveConnection {
                config: Arc::clone(&default),
                source: ConnectionSource::Environment,
            }),
            default,
            switch_lock: Mutex::new(()),
        }
    }

    /// The configuration currently in force.
    pub async fn current(&self) -> Arc<ConnectionConfig> {
        Arc::clone(&self.active.read().await.config)
    }

    /// Where the configuration currently in force came from.
    pub async fn source(&self) -> ConnectionSource {
        self.active.read().await.source
    }

    /// Configuration and source read under one lock.
    pub async fn snapshot(&self) -> (Arc<ConnectionConfig>, ConnectionSource) {
        let active = self.active.read().await;
        (Arc::clone(&active.config), active.source)
    }

    /// The startup configuration.
    pub fn default_config(&self) -> Arc<ConnectionConfig> {
        Arc::clone(&self.default)
    }

    /// Install a runtime configuration. Callers validate it first.
    pub async fn set_active(&self, config: ConnectionConfig) {
        let mut active = self.active.write().await;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Switched active connection"
        );
        *active = ActiveConnection {
            config: Arc::new(config),
            source: ConnectionSource::Runtime,
        };
    }

    /// Restore the default configuration.
    pub async fn reset(&self) {
        let mut active = self.active.write().await;
        *active = ActiveConnection {
            config: Arc::clone(&self.default),
            source: ConnectionSource::Environment,
        };
        info!(host = %self.default.host, database = %self.default.database, "Reverted to default connection");
    }

    /// Hold this while deciding and applying a connection switch.
    pub async fn lock_switch(&self) -> MutexGuard<'_, ()> {
        self.switch_lock.lock().await
    }
}
