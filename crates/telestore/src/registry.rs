//! Connections registered by alias.
//!
//! Opening a store under an alias that is already registered reuses the
//! existing connection instead of opening a second one. The registry is an
//! ordinary value owned by the caller, not process-wide state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{Result, StoreConfig, StoreError};

/// A connection shared between every store using the same alias.
pub type SharedConnection = Arc<Mutex<Connection>>;

#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<Mutex<HashMap<String, SharedConnection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection for `config.alias`, opening it on first use.
    pub fn connect(&self, config: &StoreConfig) -> Result<SharedConnection> {
        let mut connections = self.lock_map()?;
        if let Some(existing) = connections.get(&config.alias) {
            tracing::debug!(alias = %config.alias, "Reusing registered connection");
            return Ok(Arc::clone(existing));
        }

        let path = config.db_path();
        let conn = telestore_db::connect(path.as_deref(), &config.db_options())?;
        tracing::info!(
            alias = %config.alias,
            path = %path.as_ref().map_or_else(|| ":memory:".into(), |p| p.display().to_string()),
            "Opened session database"
        );

        let shared = Arc::new(Mutex::new(conn));
        connections.insert(config.alias.clone(), Arc::clone(&shared));
        Ok(shared)
    }

    /// Registered connection for `alias`, if any.
    pub fn get(&self, alias: &str) -> Result<Option<SharedConnection>> {
        Ok(self.lock_map()?.get(alias).cloned())
    }

    /// Forget `alias`. Stores already holding the connection keep it open.
    pub fn disconnect(&self, alias: &str) -> Result<bool> {
        Ok(self.lock_map()?.remove(alias).is_some())
    }

    /// Registered aliases, sorted.
    pub fn aliases(&self) -> Result<Vec<String>> {
        let mut aliases: Vec<String> = self.lock_map()?.keys().cloned().collect();
        aliases.sort();
        Ok(aliases)
    }

    fn lock_map(&self) -> Result<MutexGuard<'_, HashMap<String, SharedConnection>>> {
        self.connections
            .lock()
            .map_err(|_| StoreError::LockPoisoned("<registry>".into()))
    }
}
