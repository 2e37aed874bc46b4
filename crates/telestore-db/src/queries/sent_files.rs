//! Sent-file cache queries.

use rusqlite::{Connection, OptionalExtension};
use telestore_types::{FileKind, InputFileRef};

use crate::Result;

/// Record a file the server already has, keyed by its file id.
pub fn insert(
    conn: &Connection,
    md5_digest: &[u8],
    file_size: i64,
    file: &InputFileRef,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO sent_files (id, md5_digest, file_size, type, hash)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            file.id(),
            md5_digest,
            file_size,
            file.kind().tag(),
            file.access_hash(),
        ],
    )?;
    tracing::debug!(id = file.id(), kind = ?file.kind(), file_size, "Cached sent file");
    Ok(())
}

/// Look up a cached file reference by the composite cache key.
pub fn find(
    conn: &Connection,
    md5_digest: &[u8],
    file_size: i64,
    kind: FileKind,
) -> Result<Option<InputFileRef>> {
    let found: Option<(i64, i64, i64)> = conn
        .query_row(
            "SELECT id, hash, type FROM sent_files
             WHERE md5_digest = ?1 AND file_size = ?2 AND type = ?3
             LIMIT 1",
            rusqlite::params![md5_digest, file_size, kind.tag()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    match found {
        Some((id, access_hash, tag)) => {
            Ok(Some(InputFileRef::new(FileKind::from_tag(tag)?, id, access_hash)))
        }
        None => Ok(None),
    }
}

/// Number of cached files.
pub fn count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM sent_files", [], |row| row.get(0))?;
    Ok(count as u64)
}
