//! Schema version gate.
//!
//! The version lives in the `schema_version` table. Migrations are
//! forward-only; a database written by a newer release is refused.

use rusqlite::Connection;

use crate::queries::version;
use crate::{schema, DbError, Result, CURRENT_VERSION};

/// Create missing tables and bring the version marker up to date.
///
/// Returns the version recorded after the gate ran.
pub fn run(conn: &Connection) -> Result<u32> {
    conn.execute_batch(schema::SCHEMA_V1)?;

    if version::count(conn)? == 0 {
        tracing::info!("Initializing session schema v{CURRENT_VERSION}");
        version::insert(conn, CURRENT_VERSION)?;
        return Ok(CURRENT_VERSION);
    }

    if let Some(newest) = version::current(conn)? {
        if newest > CURRENT_VERSION {
            return Err(DbError::Migration(format!(
                "Database version {newest} is newer than supported {CURRENT_VERSION}"
            )));
        }
    }

    let outdated = version::below(conn, CURRENT_VERSION)?;
    if let Some(&oldest) = outdated.first() {
        let tx = conn.unchecked_transaction()?;
        upgrade(&tx, oldest)?;
        let removed = version::delete_below(&tx, CURRENT_VERSION)?;
        if !version::exists(&tx, CURRENT_VERSION)? {
            version::insert(&tx, CURRENT_VERSION)?;
        }
        tx.commit()?;
        tracing::info!(from = oldest, removed, "Upgraded session schema to v{CURRENT_VERSION}");
    }

    Ok(CURRENT_VERSION)
}

/// Apply every migration after `old`.
fn upgrade(conn: &Connection, old: u32) -> Result<()> {
    for version in (old + 1)..=CURRENT_VERSION {
        tracing::info!("Running migration to v{version}");
        run_migration(conn, version)?;
    }
    Ok(())
}

/// Run a specific migration.
fn run_migration(_conn: &Connection, version: u32) -> Result<()> {
    match version {
        // v1 tables are created by SCHEMA_V1 before the gate runs.
        1 => Ok(()),
        // Future migrations go here:
        // 2 => migration_v2(conn),
        _ => Err(DbError::Migration(format!(
            "Unknown migration version: {version}"
        ))),
    }
}
