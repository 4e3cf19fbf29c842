use anyhow::Result;
use async_trait::async_trait;

use super::KeyValueStore;
use crate::db::Database;

/// Durable medium backed by the `kv_store` table.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.db.kv_get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.db.kv_set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.db.kv_remove(key).await.map(|_| ())
    }
}
