use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::Database;

impl Database {
    /// Read the raw value stored under `key`.
    pub async fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .with_context(|| format!("failed to read kv entry '{key}'"))?;
            Ok(value)
        })
        .await
    }

    /// Overwrite the value under `key`, creating the row if needed.
    pub async fn kv_set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write kv entry '{key}'"))?;
            Ok(())
        })
        .await
    }

    /// Delete the row for `key`. Returns whether a row existed.
    pub async fn kv_remove(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.execute(move |conn| {
            let rows_affected = conn
                .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                .with_context(|| format!("failed to delete kv entry '{key}'"))?;
            Ok(rows_affected > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(dir.path().join("kv.sqlite3")).expect("open database");
        (dir, db)
    }

    #[tokio::test]
    async fn test_set_get_overwrite_remove() {
        let (_dir, db) = temp_db();

        assert_eq!(db.kv_get("encounter_notes").await.unwrap(), None);

        db.kv_set("encounter_notes", "[]".into()).await.unwrap();
        assert_eq!(
            db.kv_get("encounter_notes").await.unwrap().as_deref(),
            Some("[]")
        );

        db.kv_set("encounter_notes", "[1]".into()).await.unwrap();
        assert_eq!(
            db.kv_get("encounter_notes").await.unwrap().as_deref(),
            Some("[1]")
        );

        assert!(db.kv_remove("encounter_notes").await.unwrap());
        assert!(!db.kv_remove("encounter_notes").await.unwrap());
        assert_eq!(db.kv_get("encounter_notes").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (_dir, db) = temp_db();

        db.kv_set("encounter_notes", "[]".into()).await.unwrap();
        db.kv_set("app_settings", "{}".into()).await.unwrap();
        db.kv_remove("encounter_notes").await.unwrap();

        assert_eq!(
            db.kv_get("app_settings").await.unwrap().as_deref(),
            Some("{}")
        );
    }
}
