//! # telestore-db
//!
//! SQLite access layer for session storage.
//!
//! ## Schema
//!
//! - One table per collection: `schema_version`, `sessions`, `entities`,
//!   `sent_files`, `update_states`
//! - The session row lives in a fixed singleton slot
//! - All timestamps are Unix epoch seconds
//! - Schema version stored in the `schema_version` table

pub mod migrations;
pub mod queries;
pub mod schema;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<telestore_types::TypesError> for DbError {
    fn from(e: telestore_types::TypesError) -> Self {
        DbError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// SQLite journal mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
    Truncate,
    Memory,
}

impl fmt::Display for JournalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalMode::Wal => write!(f, "WAL"),
            JournalMode::Delete => write!(f, "DELETE"),
            JournalMode::Truncate => write!(f, "TRUNCATE"),
            JournalMode::Memory => write!(f, "MEMORY"),
        }
    }
}

/// Driver options applied when a connection is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbOptions {
    pub journal_mode: JournalMode,
    pub busy_timeout: Duration,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            journal_mode: JournalMode::Wal,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Open or create the session database at the given path.
///
/// Configures pragmas and runs the version gate.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = connect(Some(path), &DbOptions::default())?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let conn = connect(None, &DbOptions::default())?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open and configure a connection without touching the schema.
///
/// `None` opens a private in-memory database.
pub fn connect(path: Option<&Path>, options: &DbOptions) -> Result<Connection> {
    let conn = match path {
        Some(path) => Connection::open(path)?,
        None => Connection::open_in_memory()?,
    };
    configure(&conn, options)?;
    Ok(conn)
}

/// Configure SQLite pragmas.
fn configure(conn: &Connection, options: &DbOptions) -> Result<()> {
    conn.busy_timeout(options.busy_timeout)?;
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = {};
         PRAGMA synchronous = NORMAL;",
        options.journal_mode
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let conn = open_memory().expect("open in-memory db");
        let version = queries::version::current(&conn).expect("version");
        assert_eq!(version, Some(CURRENT_VERSION));
    }

    #[test]
    fn test_journal_mode() {
        let conn = open_memory().expect("open");
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("get journal_mode");
        // In-memory databases use "memory" mode, not WAL
        assert!(mode == "wal" || mode == "memory");
    }

    #[test]
    fn test_open_file_uses_wal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let conn = open(&dir.path().join("session.db")).expect("open");
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("get journal_mode");
        assert_eq!(mode, "wal");
    }

    #[test]
    fn test_connect_leaves_schema_alone() {
        let conn = connect(None, &DbOptions::default()).expect("connect");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .expect("count tables");
        assert_eq!(count, 0);
    }
}
