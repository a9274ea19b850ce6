//! v002 -- Storage requests submitted through the contact form.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS storage_requests (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    email      TEXT NOT NULL,               -- lower-cased
    image_code TEXT NOT NULL,
    reason     TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'PENDING',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_storage_requests_status
    ON storage_requests(status, created_at);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
