//! Update-state checkpoint queries.

use rusqlite::{Connection, OptionalExtension, Row};
use telestore_types::UpdateState;

use crate::Result;

/// Insert or replace the checkpoint for `entity_id`.
pub fn set(conn: &Connection, entity_id: i64, state: &UpdateState) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO update_states (id, pts, qts, date, seq)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![entity_id, state.pts, state.qts, state.date, state.seq],
    )?;
    tracing::debug!(entity_id, pts = state.pts, "Stored update state");
    Ok(())
}

/// Checkpoint for `entity_id`, if one was stored.
pub fn get(conn: &Connection, entity_id: i64) -> Result<Option<UpdateState>> {
    let state = conn
        .query_row(
            "SELECT pts, qts, date, seq FROM update_states WHERE id = ?1",
            [entity_id],
            from_row,
        )
        .optional()?;
    Ok(state)
}

/// Every stored checkpoint with its entity id.
pub fn list(conn: &Connection) -> Result<Vec<(i64, UpdateState)>> {
    let mut stmt = conn.prepare("SELECT id, pts, qts, date, seq FROM update_states ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                UpdateState::new(row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?),
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<UpdateState> {
    Ok(UpdateState::new(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_set_and_get() {
        let conn = test_db();
        let state = UpdateState::new(100, 5, 1_700_000_000, 12);
        set(&conn, 0, &state).expect("set");
        assert_eq!(get(&conn, 0).expect("get"), Some(state));
        assert_eq!(get(&conn, 1).expect("missing"), None);
    }

    #[test]
    fn test_set_replaces() {
        let conn = test_db();
        set(&conn, 7, &UpdateState::new(1, 1, 1, 1)).expect("set");
        set(&conn, 7, &UpdateState::new(2, 3, 4, 5)).expect("set");

        let all = list(&conn).expect("list");
        assert_eq!(all, vec![(7, UpdateState::new(2, 3, 4, 5))]);
    }

    #[test]
    fn test_unread_count_is_not_stored() {
        let conn = test_db();
        let mut state = UpdateState::new(1, 2, 3, 4);
        state.unread_count = 9;
        set(&conn, 3, &state).expect("set");
        assert_eq!(get(&conn, 3).expect("get").expect("row").unread_count, 0);
    }
}
