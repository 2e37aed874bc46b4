//! Entity cache queries.

use rusqlite::{params_from_iter, Connection, OptionalExtension};
use telestore_types::{EntityRow, IdHash};

use crate::Result;

/// Insert or replace an entity row, keyed by its marked id.
pub fn insert(conn: &Connection, row: &EntityRow) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO entities (id, hash, username, phone, name)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![row.id, row.hash, row.username, row.phone, row.name],
    )?;
    Ok(())
}

/// Insert a batch of rows inside one transaction.
pub fn insert_many(conn: &Connection, rows: &[EntityRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for row in rows {
        insert(&tx, row)?;
    }
    tx.commit()?;
    Ok(())
}

pub fn find_by_phone(conn: &Connection, phone: &str) -> Result<Option<IdHash>> {
    find_by_column(conn, "phone", phone)
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<IdHash>> {
    find_by_column(conn, "username", username)
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<IdHash>> {
    find_by_column(conn, "name", name)
}

/// Look up a row by its marked id.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<IdHash>> {
    let found = conn
        .query_row(
            "SELECT id, hash FROM entities WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(found)
}

/// First row whose id is any of `ids`, preferring earlier entries of `ids`.
pub fn find_by_any_id(conn: &Connection, ids: &[i64]) -> Result<Option<IdHash>> {
    if ids.is_empty() {
        return Ok(None);
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT id, hash FROM entities WHERE id IN ({placeholders})"
    ))?;
    let found = stmt
        .query_map(params_from_iter(ids.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<std::result::Result<Vec<IdHash>, _>>()?;

    Ok(ids
        .iter()
        .find_map(|id| found.iter().find(|(row_id, _)| row_id == id).copied()))
}

/// Number of cached entities.
pub fn count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))?;
    Ok(count as u64)
}

// `column` is always one of the indexed lookup columns above, never user input.
fn find_by_column(conn: &Connection, column: &str, value: &str) -> Result<Option<IdHash>> {
    let found = conn
        .query_row(
            &format!("SELECT id, hash FROM entities WHERE {column} = ?1 LIMIT 1"),
            [value],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    tracing::debug!(column, hit = found.is_some(), "Entity lookup");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    fn alice() -> EntityRow {
        EntityRow {
            id: 42,
            hash: 99,
            username: Some("alice".into()),
            phone: Some("15551234".into()),
            name: Some("Alice Liddell".into()),
        }
    }

    #[test]
    fn test_lookup_by_indexed_fields() {
        let conn = test_db();
        insert(&conn, &alice()).expect("insert");

        assert_eq!(find_by_username(&conn, "alice").expect("u"), Some((42, 99)));
        assert_eq!(find_by_phone(&conn, "15551234").expect("p"), Some((42, 99)));
        assert_eq!(find_by_name(&conn, "Alice Liddell").expect("n"), Some((42, 99)));
        assert_eq!(find_by_username(&conn, "bob").expect("miss"), None);
    }

    #[test]
    fn test_reinsert_replaces() {
        let conn = test_db();
        insert(&conn, &alice()).expect("insert");
        let mut renamed = alice();
        renamed.hash = 100;
        renamed.username = Some("alice2".into());
        insert(&conn, &renamed).expect("reinsert");

        assert_eq!(count(&conn).expect("count"), 1);
        assert_eq!(find_by_username(&conn, "alice").expect("old"), None);
        assert_eq!(find_by_id(&conn, 42).expect("id"), Some((42, 100)));
    }

    #[test]
    fn test_find_by_any_id_prefers_order() {
        let conn = test_db();
        let chat = EntityRow {
            id: -7,
            hash: 0,
            username: None,
            phone: None,
            name: Some("chat".into()),
        };
        let channel = EntityRow {
            id: -1_000_000_000_007,
            hash: 70,
            username: None,
            phone: None,
            name: Some("channel".into()),
        };
        insert_many(&conn, &[channel, chat]).expect("insert");

        let found = find_by_any_id(&conn, &[7, -7, -1_000_000_000_007]).expect("lookup");
        assert_eq!(found, Some((-7, 0)));
        assert_eq!(find_by_any_id(&conn, &[]).expect("empty"), None);
    }

    #[test]
    fn test_null_columns_never_match() {
        let conn = test_db();
        let mut row = alice();
        row.phone = None;
        insert(&conn, &row).expect("insert");
        assert_eq!(find_by_phone(&conn, "").expect("lookup"), None);
    }
}
