use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};

use super::{
    gateway::NotesGateway,
    model::{generate_id, materialize_at, EncounterDraft, EncounterRecord, EncounterStatus},
    sort_recent_first,
};
use crate::storage::StorageError;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// A committed view of the collection. `version` increases on every
/// reload and every successful mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub records: Arc<Vec<EncounterRecord>>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct Cache {
    records: Option<Arc<Vec<EncounterRecord>>>,
    version: u64,
}

struct RepositoryInner {
    gateway: NotesGateway,
    cache: Mutex<Cache>,
    updates: watch::Sender<Snapshot>,
}

/// Process-wide owner of the encounter collection.
///
/// Mutations are serialized through one lock and applied to a copy; the
/// cached collection only changes once the gateway has persisted the copy.
/// A failed save therefore leaves the last-known-good collection in place.
#[derive(Clone)]
pub struct NotesRepository {
    inner: Arc<RepositoryInner>,
}

impl NotesRepository {
    pub fn new(gateway: NotesGateway) -> Self {
        let (updates, _) = watch::channel(Snapshot {
            version: 0,
            records: Arc::new(Vec::new()),
        });

        Self {
            inner: Arc::new(RepositoryInner {
                gateway,
                cache: Mutex::new(Cache {
                    records: None,
                    version: 0,
                }),
                updates,
            }),
        }
    }

    pub async fn list(&self) -> Result<Snapshot, StorageError> {
        let mut cache = self.inner.cache.lock().await;
        let records = self.loaded(&mut cache).await?;
        Ok(Snapshot {
            version: cache.version,
            records,
        })
    }

    /// Records ordered by timestamp, newest first.
    pub async fn recent(&self) -> Result<Vec<EncounterRecord>, StorageError> {
        let mut records = self.list().await?.records.as_ref().clone();
        sort_recent_first(&mut records);
        Ok(records)
    }

    /// Newest-first records with the given status.
    pub async fn by_status(
        &self,
        status: &EncounterStatus,
    ) -> Result<Vec<EncounterRecord>, StorageError> {
        let mut records = self.recent().await?;
        records.retain(|record| &record.status == status);
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Option<EncounterRecord>, StorageError> {
        let snapshot = self.list().await?;
        Ok(snapshot.records.iter().find(|record| record.id == id).cloned())
    }

    pub async fn add(&self, draft: EncounterDraft) -> Result<EncounterRecord, StorageError> {
        self.add_at(draft, Utc::now()).await
    }

    /// Insert a new record at the front of the collection.
    pub async fn add_at(
        &self,
        draft: EncounterDraft,
        now: DateTime<Utc>,
    ) -> Result<EncounterRecord, StorageError> {
        let mut cache = self.inner.cache.lock().await;
        let current = self.loaded(&mut cache).await?;

        let id = unique_id(&current, now);
        let record = materialize_at(draft, Some(&id), now);

        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(record.clone());
        next.extend(current.iter().cloned());

        self.commit(&mut cache, next).await?;
        Ok(record)
    }

    pub async fn edit(
        &self,
        id: &str,
        draft: EncounterDraft,
    ) -> Result<EncounterRecord, StorageError> {
        self.edit_at(id, draft, Utc::now()).await
    }

    /// Replace the record with `id`, keeping its id, its position and any keys
    /// the schema does not know. An id that is not in the collection is
    /// inserted at the front under that id.
    pub async fn edit_at(
        &self,
        id: &str,
        draft: EncounterDraft,
        now: DateTime<Utc>,
    ) -> Result<EncounterRecord, StorageError> {
        let mut cache = self.inner.cache.lock().await;
        let current = self.loaded(&mut cache).await?;

        let mut record = materialize_at(draft, Some(id), now);
        let mut next = current.as_ref().clone();
        match next.iter().position(|existing| existing.id == id) {
            Some(index) => {
                record.extra = std::mem::take(&mut next[index].extra);
                next[index] = record.clone();
            }
            None => next.insert(0, record.clone()),
        }

        self.commit(&mut cache, next).await?;
        Ok(record)
    }

    /// Remove the record with `id`. Returns `false` (and writes nothing) when
    /// no such record exists.
    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut cache = self.inner.cache.lock().await;
        let current = self.loaded(&mut cache).await?;

        if !current.iter().any(|record| record.id == id) {
            return Ok(false);
        }

        let next: Vec<EncounterRecord> = current
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();

        self.commit(&mut cache, next).await?;
        Ok(true)
    }

    /// Remove the stored collection entirely.
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        let mut cache = self.inner.cache.lock().await;

        if let Err(err) = self.inner.gateway.clear().await {
            log_error!("Failed to clear encounter notes: {err}");
            return Err(err);
        }

        log_info!("Cleared all encounter notes");
        self.publish(&mut cache, Arc::new(Vec::new()));
        Ok(())
    }

    /// Drop the cached collection so the next read goes back to storage.
    pub async fn invalidate(&self) {
        let mut cache = self.inner.cache.lock().await;
        cache.records = None;
    }

    pub async fn version(&self) -> u64 {
        self.inner.cache.lock().await.version
    }

    /// Receiver that sees every committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.updates.subscribe()
    }

    async fn loaded(
        &self,
        cache: &mut Cache,
    ) -> Result<Arc<Vec<EncounterRecord>>, StorageError> {
        if let Some(records) = &cache.records {
            return Ok(Arc::clone(records));
        }

        let records = Arc::new(self.inner.gateway.load().await?);
        self.publish(cache, Arc::clone(&records));
        Ok(records)
    }

    async fn commit(
        &self,
        cache: &mut Cache,
        next: Vec<EncounterRecord>,
    ) -> Result<(), StorageError> {
        if let Err(err) = self.inner.gateway.save(&next).await {
            log_error!(
                "Failed to save encounter notes; keeping version {}: {err}",
                cache.version
            );
            return Err(err);
        }

        self.publish(cache, Arc::new(next));
        Ok(())
    }

    fn publish(&self, cache: &mut Cache, records: Arc<Vec<EncounterRecord>>) {
        cache.version += 1;
        cache.records = Some(Arc::clone(&records));
        self.inner.updates.send_replace(Snapshot {
            version: cache.version,
            records,
        });
    }
}

/// Millisecond id for `now`, bumped forward past any id already taken.
fn unique_id(records: &[EncounterRecord], now: DateTime<Utc>) -> String {
    let taken = |candidate: &str| records.iter().any(|record| record.id == candidate);

    let mut candidate = generate_id(now);
    let mut millis = now.timestamp_millis();
    while taken(&candidate) {
        millis += 1;
        candidate = millis.to_string();
    }
    candidate
}
