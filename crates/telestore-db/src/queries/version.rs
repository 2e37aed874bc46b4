//! Schema version marker queries.

use rusqlite::Connection;

use crate::Result;

/// Number of version rows.
pub fn count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM schema_version", [], |row| {
        row.get(0)
    })?;
    Ok(count as u64)
}

/// Record a version.
pub fn insert(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Highest recorded version, if any.
pub fn current(conn: &Connection) -> Result<Option<u32>> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;
    Ok(version)
}

/// Whether `version` is recorded.
pub fn exists(conn: &Connection, version: u32) -> Result<bool> {
    let found: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM schema_version WHERE version = ?1)",
        [version],
        |row| row.get(0),
    )?;
    Ok(found != 0)
}

/// Recorded versions below `version`, oldest first.
pub fn below(conn: &Connection, version: u32) -> Result<Vec<u32>> {
    let mut stmt =
        conn.prepare("SELECT version FROM schema_version WHERE version < ?1 ORDER BY version")?;
    let rows = stmt
        .query_map([version], |row| row.get(0))?
        .collect::<std::result::Result<Vec<u32>, _>>()?;
    Ok(rows)
}

/// Delete every version row below `version`. Returns the number removed.
pub fn delete_below(conn: &Connection, version: u32) -> Result<usize> {
    let removed = conn.execute("DELETE FROM schema_version WHERE version < ?1", [version])?;
    Ok(removed)
}
