//! v001 -- Image catalog.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id         TEXT PRIMARY KEY NOT NULL,   -- opaque catalog id
    code       TEXT NOT NULL,               -- short display code
    number     INTEGER NOT NULL,            -- ordering key
    url        TEXT NOT NULL,               -- full-resolution asset
    folder     TEXT NOT NULL,
    created_at TEXT NOT NULL,               -- RFC-3339
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_images_number ON images(number, id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
