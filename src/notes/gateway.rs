use std::sync::Arc;

use super::model::EncounterRecord;
use crate::storage::{KeyValueStore, Slot, StorageError};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

pub const NOTES_KEY: &str = "encounter_notes";

/// Load/save/clear for the whole encounter collection under
/// [`NOTES_KEY`]. Holds no state of its own.
#[derive(Clone)]
pub struct NotesGateway {
    slot: Slot<Vec<EncounterRecord>>,
}

impl NotesGateway {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            slot: Slot::new(kv, NOTES_KEY),
        }
    }

    /// Stored collection, or empty when the key is absent or its value
    /// cannot be decoded.
    pub async fn load(&self) -> Result<Vec<EncounterRecord>, StorageError> {
        match self.try_load().await {
            Err(err) if err.is_decode() => {
                log_warn!("Treating undecodable {} as empty: {err}", NOTES_KEY);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Like [`load`](Self::load) but reports a corrupt value as
    /// [`StorageError::Decode`].
    pub async fn try_load(&self) -> Result<Vec<EncounterRecord>, StorageError> {
        let notes = self.slot.read().await?.unwrap_or_default();
        log_debug!("Loaded {} encounter notes", notes.len());
        Ok(notes)
    }

    pub async fn save(&self, notes: &[EncounterRecord]) -> Result<(), StorageError> {
        self.slot.write(&notes.to_vec()).await?;
        log_debug!("Saved {} encounter notes", notes.len());
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.slot.remove().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::model::{materialize_at, EncounterDraft, EncounterStatus};
    use crate::storage::{testing::FlakyStore, MemoryStore, StorageOp};
    use chrono::{Duration, TimeZone, Utc};

    fn sample(count: usize) -> Vec<EncounterRecord> {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let status = if i % 2 == 0 {
                    EncounterStatus::Accepted
                } else {
                    EncounterStatus::Rejected
                };
                let mut draft = EncounterDraft::new(format!("person {i}"), status);
                draft.location = Some("Park".into());
                materialize_at(draft, None, base + Duration::minutes(i as i64))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_round_trip() {
        let gateway = NotesGateway::new(Arc::new(MemoryStore::new()));
        let notes = sample(3);

        gateway.save(&notes).await.unwrap();
        assert_eq!(gateway.load().await.unwrap(), notes);
    }

    #[tokio::test]
    async fn test_reload_preserves_statuses_and_stats() {
        let gateway = NotesGateway::new(Arc::new(MemoryStore::new()));
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap();
        let notes: Vec<EncounterRecord> = ["accepted", "rejected", "", "pending"]
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let draft = EncounterDraft::new("x", EncounterStatus::parse(raw));
                materialize_at(draft, Some(i.to_string().as_str()), now)
            })
            .collect();

        gateway.save(&notes).await.unwrap();
        let loaded = gateway.load().await.unwrap();

        assert_eq!(loaded, notes);
        assert_eq!(crate::stats::overall_split(&loaded), crate::stats::overall_split(&notes));
        assert_eq!(crate::stats::overall_split(&loaded).accepted_pct, 25);
    }

    #[tokio::test]
    async fn test_absent_key_loads_empty() {
        let gateway = NotesGateway::new(Arc::new(MemoryStore::new()));
        assert!(gateway.load().await.unwrap().is_empty());
        assert!(gateway.try_load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_then_load_is_empty() {
        let gateway = NotesGateway::new(Arc::new(MemoryStore::new()));
        gateway.save(&sample(2)).await.unwrap();
        gateway.clear().await.unwrap();
        assert!(gateway.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_absorbed_by_load_only() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(NOTES_KEY, "not json at all".into()).await.unwrap();
        let gateway = NotesGateway::new(kv);

        assert!(gateway.load().await.unwrap().is_empty());

        let err = gateway.try_load().await.expect_err("corruption is visible");
        assert!(err.is_decode());
        assert_eq!(err.key(), NOTES_KEY);
    }

    #[tokio::test]
    async fn test_medium_failure_is_not_absorbed() {
        let kv = Arc::new(FlakyStore::default());
        let gateway = NotesGateway::new(kv.clone());

        kv.fail_reads(true);
        let err = gateway.load().await.expect_err("read failure surfaces");
        assert_eq!(err.op(), Some(StorageOp::Get));
        assert_eq!(err.key(), NOTES_KEY);

        kv.fail_writes(true);
        let err = gateway.save(&sample(1)).await.expect_err("write failure surfaces");
        assert_eq!(err.op(), Some(StorageOp::Set));

        let err = gateway.clear().await.expect_err("remove failure surfaces");
        assert_eq!(err.op(), Some(StorageOp::Remove));
    }
}
