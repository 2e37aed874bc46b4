//! Store configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use telestore_db::{DbOptions, JournalMode};

use crate::{Result, StoreError};

/// How to reach the session database.
///
/// The database is a local SQLite file, so a file path and driver options
/// take the place of server host, port, database name and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name the connection is registered under. Stores opened with the
    /// same alias share one connection.
    #[serde(default = "default_alias")]
    pub alias: String,
    /// Database file. Empty = in-memory database.
    #[serde(default)]
    pub path: String,
    /// SQLite journal mode.
    #[serde(default)]
    pub journal_mode: JournalMode,
    /// How long a locked database is retried before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Record entities seen in server responses.
    #[serde(default = "default_true")]
    pub save_entities: bool,
}

// Default value functions

fn default_alias() -> String {
    "telestore".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            alias: default_alias(),
            path: String::new(),
            journal_mode: JournalMode::default(),
            busy_timeout_ms: default_busy_timeout_ms(),
            save_entities: true,
        }
    }
}

impl StoreConfig {
    /// File-backed config registered under `alias`.
    pub fn file(alias: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            alias: alias.into(),
            path: path.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    /// In-memory config registered under `alias`.
    pub fn memory(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            ..Self::default()
        }
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig =
            toml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))?;
        if config.alias.trim().is_empty() {
            return Err(StoreError::Config("alias must not be empty".into()));
        }
        Ok(config)
    }

    /// Database file, or `None` for an in-memory database.
    pub fn db_path(&self) -> Option<PathBuf> {
        if self.path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.path))
        }
    }

    /// Driver options passed through to the database layer.
    pub fn db_options(&self) -> DbOptions {
        DbOptions {
            journal_mode: self.journal_mode,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}
