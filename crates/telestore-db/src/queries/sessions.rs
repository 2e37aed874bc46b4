//! Session row queries.
//!
//! The row is pinned to `slot = 0`, so writing it is a single upsert and
//! readers never observe an empty table between a delete and an insert.

use rusqlite::{Connection, OptionalExtension, Row};
use telestore_types::SessionRecord;

use crate::Result;

const SELECT_COLUMNS: &str =
    "SELECT dc_id, server_address, port, auth_key, takeout_id FROM sessions";

/// Replace the session row.
pub fn upsert(conn: &Connection, record: &SessionRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO sessions (slot, dc_id, server_address, port, auth_key, takeout_id)
         VALUES (0, ?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(slot) DO UPDATE SET
             dc_id = excluded.dc_id,
             server_address = excluded.server_address,
             port = excluded.port,
             auth_key = excluded.auth_key,
             takeout_id = excluded.takeout_id",
        rusqlite::params![
            record.dc_id,
            record.server_address,
            record.port,
            record.auth_key,
            record.takeout_id,
        ],
    )?;
    tracing::debug!(dc_id = record.dc_id, "Persisted session row");
    Ok(())
}

/// The stored session, if any.
pub fn first(conn: &Connection) -> Result<Option<SessionRecord>> {
    let record = conn
        .query_row(&format!("{SELECT_COLUMNS} ORDER BY slot LIMIT 1"), [], from_row)
        .optional()?;
    Ok(record)
}

/// Every stored session.
pub fn list(conn: &Connection) -> Result<Vec<SessionRecord>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY slot"))?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Number of stored sessions.
pub fn count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Delete the session whose auth key equals `auth_key`.
pub fn delete_by_auth_key(conn: &Connection, auth_key: &[u8]) -> Result<usize> {
    let removed = conn.execute("DELETE FROM sessions WHERE auth_key = ?1", [auth_key])?;
    Ok(removed)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        dc_id: row.get(0)?,
        server_address: row.get(1)?,
        port: row.get(2)?,
        auth_key: row.get(3)?,
        takeout_id: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    fn record(dc_id: i32, key: u8) -> SessionRecord {
        SessionRecord {
            dc_id,
            server_address: Some("149.154.167.51".into()),
            port: Some(443),
            auth_key: vec![key; 256],
            takeout_id: None,
        }
    }

    #[test]
    fn test_empty_table() {
        let conn = test_db();
        assert!(first(&conn).expect("first").is_none());
        assert!(list(&conn).expect("list").is_empty());
    }

    #[test]
    fn test_upsert_keeps_single_row() {
        let conn = test_db();
        upsert(&conn, &record(1, 1)).expect("upsert");
        upsert(&conn, &record(2, 2)).expect("upsert");
        upsert(&conn, &record(4, 3)).expect("upsert");

        assert_eq!(count(&conn).expect("count"), 1);
        let stored = first(&conn).expect("first").expect("row");
        assert_eq!(stored.dc_id, 4);
        assert_eq!(stored.auth_key, vec![3u8; 256]);
    }

    #[test]
    fn test_delete_by_auth_key() {
        let conn = test_db();
        upsert(&conn, &record(2, 9)).expect("upsert");

        assert_eq!(delete_by_auth_key(&conn, &[1u8; 256]).expect("miss"), 0);
        assert_eq!(delete_by_auth_key(&conn, &[9u8; 256]).expect("hit"), 1);
        assert_eq!(count(&conn).expect("count"), 0);
    }

    #[test]
    fn test_nullable_columns() {
        let conn = test_db();
        let bare = SessionRecord::default();
        upsert(&conn, &bare).expect("upsert");
        assert_eq!(first(&conn).expect("first"), Some(bare));
    }
}
