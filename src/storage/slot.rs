use std::{marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};

use super::{KeyValueStore, StorageError, StorageOp};

/// One JSON document of type `T` stored under a single key and always
/// written in full.
pub struct Slot<T> {
    kv: Arc<dyn KeyValueStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T> Slot<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(kv: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            kv,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// `Ok(None)` when nothing was ever written under the key.
    pub async fn read(&self) -> Result<Option<T>, StorageError> {
        let raw = self
            .kv
            .get(self.key)
            .await
            .map_err(|source| self.medium_error(StorageOp::Get, source))?;

        match raw {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Decode {
                    key: self.key.to_string(),
                    source,
                }),
        }
    }

    pub async fn write(&self, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: self.key.to_string(),
            source,
        })?;

        self.kv
            .set(self.key, encoded)
            .await
            .map_err(|source| self.medium_error(StorageOp::Set, source))
    }

    pub async fn remove(&self) -> Result<(), StorageError> {
        self.kv
            .remove(self.key)
            .await
            .map_err(|source| self.medium_error(StorageOp::Remove, source))
    }

    fn medium_error(&self, op: StorageOp, source: anyhow::Error) -> StorageError {
        StorageError::Medium {
            op,
            key: self.key.to_string(),
            source,
        }
    }
}
