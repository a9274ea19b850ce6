use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use vitrine_shared::ValidStorageRequest;

use crate::database::Database;
use crate::error::Result;
use crate::models::{RequestStatus, StorageRequest};

impl Database {
    /// Persist a validated form as a new `PENDING` request.
    pub fn insert_storage_request(&self, form: &ValidStorageRequest) -> Result<StorageRequest> {
        let request = StorageRequest {
            id: Uuid::new_v4(),
            email: form.email.clone(),
            image_code: form.image_code.clone(),
            reason: form.reason.clone(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };

        self.conn().execute(
            "INSERT INTO storage_requests (id, email, image_code, reason, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                request.id.to_string(),
                request.email,
                request.image_code,
                request.reason,
                request.status.as_str(),
                request.created_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!(id = %request.id, code = %request.image_code, "storage request stored");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    use crate::error::StoreError;

    fn fetch(db: &Database, id: Uuid) -> Result<StorageRequest> {
        db.conn()
            .query_row(
                "SELECT id, email, image_code, reason, status, created_at
                 FROM storage_requests WHERE id = ?1",
                params![id.to_string()],
                row_to_request,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    fn row_to_request(row: &rusqlite::Row<'_>) -> rusqlite::Result<StorageRequest> {
        let id_str: String = row.get(0)?;
        let status_str: String = row.get(4)?;
        let ts_str: String = row.get(5)?;

        let id = Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let status = RequestStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown status {status_str}").into(),
            )
        })?;

        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(StorageRequest {
            id,
            email: row.get(1)?,
            image_code: row.get(2)?,
            reason: row.get(3)?,
            status,
            created_at,
        })
    }

    #[test]
    fn insert_then_fetch() {
        let db = Database::open_in_memory().unwrap();
        let form = ValidStorageRequest {
            email: "fan@example.com".into(),
            image_code: "S-12345".into(),
            reason: "favourite".into(),
        };

        let stored = db.insert_storage_request(&form).unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);

        let fetched = fetch(&db, stored.id).unwrap();
        assert_eq!(fetched.email, "fan@example.com");
        assert_eq!(fetched.image_code, "S-12345");
        assert_eq!(fetched.status, RequestStatus::Pending);
        assert_eq!(fetched.created_at, stored.created_at);
    }

    #[test]
    fn unknown_request_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            fetch(&db, Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
    }
}
