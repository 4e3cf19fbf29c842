//! Key-value medium underneath the gateways.
//!
//! A medium stores opaque strings by key. Everything above it (the notes
//! gateway, the settings store) writes whole JSON documents through a
//! [`Slot`], so a medium never needs partial updates.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

mod memory;
mod slot;
mod sqlite;

pub use memory::MemoryStore;
pub use slot::Slot;
pub use sqlite::SqliteStore;

/// Local key-value storage. Every call may fail.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removing a key that does not exist is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Get,
    Set,
    Remove,
}

impl StorageOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageOp::Get => "get",
            StorageOp::Set => "set",
            StorageOp::Remove => "remove",
        }
    }
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage {op} failed for key '{key}': {source}")]
    Medium {
        op: StorageOp,
        key: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored value under key '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn key(&self) -> &str {
        match self {
            StorageError::Medium { key, .. }
            | StorageError::Encode { key, .. }
            | StorageError::Decode { key, .. } => key,
        }
    }

    /// The medium operation that failed, if the failure came from the medium.
    pub fn op(&self) -> Option<StorageOp> {
        match self {
            StorageError::Medium { op, .. } => Some(*op),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, StorageError::Decode { .. })
    }
}
