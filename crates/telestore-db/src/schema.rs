//! SQL schema definitions.

/// Complete schema for the v1 session database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Schema version marker
-- ============================================================

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- ============================================================
-- Session (at most one row, pinned to slot 0)
-- ============================================================

CREATE TABLE IF NOT EXISTS sessions (
    slot INTEGER PRIMARY KEY CHECK (slot = 0),
    dc_id INTEGER NOT NULL,
    server_address TEXT,
    port INTEGER,
    auth_key BLOB NOT NULL,
    takeout_id INTEGER
);

-- ============================================================
-- Entity cache
-- ============================================================

CREATE TABLE IF NOT EXISTS entities (
    id INTEGER PRIMARY KEY,
    hash INTEGER NOT NULL,
    username TEXT,
    phone TEXT,
    name TEXT
);

CREATE INDEX IF NOT EXISTS idx_entities_username ON entities(username);
CREATE INDEX IF NOT EXISTS idx_entities_phone ON entities(phone);
CREATE INDEX IF NOT EXISTS idx_entities_name ON entities(name);

-- ============================================================
-- Sent-file cache
-- ============================================================

CREATE TABLE IF NOT EXISTS sent_files (
    id INTEGER PRIMARY KEY,
    md5_digest BLOB NOT NULL,
    file_size INTEGER NOT NULL,
    type INTEGER NOT NULL,
    hash INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sent_files_lookup ON sent_files(md5_digest, file_size, type);

-- ============================================================
-- Update-stream checkpoints
-- ============================================================

CREATE TABLE IF NOT EXISTS update_states (
    id INTEGER PRIMARY KEY,
    pts INTEGER NOT NULL,
    qts INTEGER NOT NULL,
    date INTEGER NOT NULL,
    seq INTEGER NOT NULL
);
"#;

/// Tables created by [`SCHEMA_V1`].
pub const TABLES: [&str; 5] = [
    "schema_version",
    "sessions",
    "entities",
    "sent_files",
    "update_states",
];
