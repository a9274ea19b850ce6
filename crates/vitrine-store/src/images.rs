use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{ImageId, ImageRecord, NewImage};

const IMAGE_COLUMNS: &str = "id, code, number, url, folder, created_at, updated_at";

impl Database {
    /// Full catalog, ascending by `number` (then `id` for a total order).
    pub fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images ORDER BY number ASC, id ASC"
        ))?;

        let rows = stmt.query_map([], row_to_image)?;

        let mut images = Vec::new();
        for row in rows {
            images.push(row?);
        }
        Ok(images)
    }

    pub fn get_image(&self, id: &ImageId) -> Result<ImageRecord> {
        self.conn()
            .query_row(
                &format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?1"),
                params![id.as_str()],
                row_to_image,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Insert or replace an image, keeping the original `created_at` of an
    /// existing row. `updated_at` only moves when the content changed or the
    /// image carries its own timestamp.
    pub fn upsert_image(&self, image: &NewImage) -> Result<()> {
        upsert(self.conn(), image, Utc::now())
    }

    /// Upsert every image of a JSON seed file in one transaction.
    ///
    /// Returns the number of images written.
    pub fn seed_images_from_file(&mut self, path: &Path) -> Result<usize> {
        let raw = std::fs::read_to_string(path)?;
        let images: Vec<NewImage> = serde_json::from_str(&raw)?;

        let now = Utc::now();
        let tx = self.conn_mut().transaction()?;
        for image in &images {
            upsert(&tx, image, now)?;
        }
        tx.commit()?;

        tracing::info!(path = %path.display(), count = images.len(), "seeded image catalog");
        Ok(images.len())
    }
}

fn upsert(conn: &Connection, image: &NewImage, now: DateTime<Utc>) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO images (id, code, number, url, folder, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            code = excluded.code,
            number = excluded.number,
            url = excluded.url,
            folder = excluded.folder,
            updated_at = CASE
                WHEN ?8 = 0
                 AND images.code = excluded.code
                 AND images.number = excluded.number
                 AND images.url = excluded.url
                 AND images.folder = excluded.folder
                THEN images.updated_at
                ELSE excluded.updated_at
            END",
    )?;
    stmt.execute(params![
        image.id.as_str(),
        image.code,
        image.number,
        image.url,
        image.folder,
        image.created_at.unwrap_or(now).to_rfc3339(),
        image.updated_at.unwrap_or(now).to_rfc3339(),
        image.updated_at.is_some(),
    ])?;
    Ok(())
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn row_to_image(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageRecord> {
    let id: String = row.get(0)?;
    let created_str: String = row.get(5)?;
    let updated_str: String = row.get(6)?;

    Ok(ImageRecord {
        id: ImageId(id),
        code: row.get(1)?,
        number: row.get(2)?,
        url: row.get(3)?,
        folder: row.get(4)?,
        created_at: parse_timestamp(5, &created_str)?,
        updated_at: parse_timestamp(6, &updated_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, number: i64) -> NewImage {
        NewImage {
            id: ImageId::from(id),
            code: format!("S-{number}"),
            number,
            url: format!("https://cdn.example/{id}.jpg"),
            folder: "2024".into(),
            created_at: None,
            updated_at: None,
        }
    }

    fn count(db: &Database) -> i64 {
        db.conn()
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
            .unwrap()
    }

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn list_is_sorted_by_number() {
        let db = Database::open_in_memory().unwrap();
        for (id, n) in [("c", 30), ("a", 10), ("d", 5), ("b", 20)] {
            db.upsert_image(&image(id, n)).unwrap();
        }

        let numbers: Vec<i64> = db.list_images().unwrap().iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![5, 10, 20, 30]);
    }

    #[test]
    fn equal_numbers_are_ordered_by_id() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_image(&image("z", 1)).unwrap();
        db.upsert_image(&image("m", 1)).unwrap();

        let ids: Vec<String> = db
            .list_images()
            .unwrap()
            .into_iter()
            .map(|i| i.id.0)
            .collect();
        assert_eq!(ids, vec!["m", "z"]);
    }

    #[test]
    fn empty_catalog_lists_nothing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list_images().unwrap().is_empty());
        assert_eq!(count(&db), 0);
    }

    #[test]
    fn get_missing_image_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.get_image(&ImageId::from("nope")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn upsert_updates_but_keeps_created_at() {
        let db = Database::open_in_memory().unwrap();
        let mut first = image("a", 1);
        let created = at("2024-01-01T00:00:00Z");
        first.created_at = Some(created);
        db.upsert_image(&first).unwrap();

        let mut second = image("a", 2);
        second.code = "S-NEW".into();
        db.upsert_image(&second).unwrap();

        let stored = db.get_image(&ImageId::from("a")).unwrap();
        assert_eq!(stored.code, "S-NEW");
        assert_eq!(stored.number, 2);
        assert_eq!(stored.created_at, created);
        assert_eq!(count(&db), 1);
    }

    #[test]
    fn unchanged_upsert_keeps_updated_at() {
        let db = Database::open_in_memory().unwrap();
        let mut first = image("a", 1);
        first.updated_at = Some(at("2024-01-01T00:00:00Z"));
        db.upsert_image(&first).unwrap();

        // Same content without a timestamp, as a seed file re-applied on restart.
        db.upsert_image(&image("a", 1)).unwrap();
        let stored = db.get_image(&ImageId::from("a")).unwrap();
        assert_eq!(stored.updated_at, at("2024-01-01T00:00:00Z"));

        let mut moved = image("a", 1);
        moved.url = "https://cdn.example/a-v2.jpg".into();
        db.upsert_image(&moved).unwrap();
        let stored = db.get_image(&ImageId::from("a")).unwrap();
        assert!(stored.updated_at > at("2024-01-01T00:00:00Z"));

        let mut stamped = moved.clone();
        stamped.updated_at = Some(at("2023-06-01T00:00:00Z"));
        db.upsert_image(&stamped).unwrap();
        let stored = db.get_image(&ImageId::from("a")).unwrap();
        assert_eq!(stored.updated_at, at("2023-06-01T00:00:00Z"));
    }

    #[test]
    fn reseeding_the_same_file_keeps_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"[{"id": "x1", "code": "S-2", "number": 2, "url": "https://cdn/x1.jpg"}]"#,
        )
        .unwrap();

        let mut db = Database::open_in_memory().unwrap();
        db.seed_images_from_file(&path).unwrap();
        let before = db.get_image(&ImageId::from("x1")).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        db.seed_images_from_file(&path).unwrap();
        let after = db.get_image(&ImageId::from("x1")).unwrap();
        assert_eq!(after.updated_at, before.updated_at);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn seed_file_is_imported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "x1", "code": "S-2", "number": 2, "url": "https://cdn/x1.jpg", "folder": "f"},
                {"id": "x2", "code": "S-1", "number": 1, "url": "https://cdn/x2.jpg"}
            ]"#,
        )
        .unwrap();

        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.seed_images_from_file(&path).unwrap(), 2);

        let images = db.list_images().unwrap();
        assert_eq!(images[0].code, "S-1");
        assert_eq!(images[0].folder, "");
        assert_eq!(images[1].folder, "f");
    }

    #[test]
    fn malformed_seed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.seed_images_from_file(&path),
            Err(StoreError::Seed(_))
        ));
    }
}
