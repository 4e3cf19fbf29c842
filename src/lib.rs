mod config;
mod db;
pub mod notes;
mod settings;
pub mod stats;
pub mod storage;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use config::{Config, DATA_DIR_ENV, DB_FILE_NAME};
pub use db::Database;
pub use notes::{
    EncounterDraft, EncounterRecord, EncounterStatus, NotesGateway, NotesRepository, Snapshot,
};
pub use settings::{AppSettings, SettingToggle, SettingsStore, SETTINGS_KEY};
pub use stats::{OverallSplit, StatsConfig, StatusCounts, WeeklyCounts, WeeklyProgress};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError, StorageOp};
pub use utils::init_logging;

/// Numbers shown on the home screen, all derived from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub split: OverallSplit,
    pub counts: StatusCounts,
    pub weekly: WeeklyCounts,
    pub progress: WeeklyProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportStatus {
    NoData,
    ComingSoon,
}

pub struct App {
    kv: Arc<dyn KeyValueStore>,
    notes: NotesRepository,
    settings: SettingsStore,
    stats: StatsConfig,
}

impl App {
    /// Open (creating if needed) the SQLite database in `config.data_dir`.
    pub async fn open(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;

        let database = Database::new(config.db_path())?;
        let app = Self::with_store(Arc::new(SqliteStore::new(database)), config.stats);
        app.settings
            .load()
            .await
            .context("failed to load app settings")?;

        log::info!("Encounter log ready in {}", config.data_dir.display());
        Ok(app)
    }

    /// Build over any medium. Settings stay at their defaults until
    /// [`SettingsStore::load`] is called.
    pub fn with_store(kv: Arc<dyn KeyValueStore>, stats: StatsConfig) -> Self {
        Self {
            notes: NotesRepository::new(NotesGateway::new(Arc::clone(&kv))),
            settings: SettingsStore::new(Arc::clone(&kv)),
            kv,
            stats,
        }
    }

    pub fn notes(&self) -> &NotesRepository {
        &self.notes
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn stats_config(&self) -> &StatsConfig {
        &self.stats
    }

    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<Dashboard, StorageError> {
        let snapshot = self.notes.list().await?;
        let records = snapshot.records.as_slice();

        let weekly = stats::weekly_counts_within(records, now, self.stats.window());
        Ok(Dashboard {
            split: stats::overall_split(records),
            counts: stats::status_counts(records),
            weekly,
            progress: stats::weekly_progress(&weekly, self.stats.weekly_target),
        })
    }

    pub async fn clear_all_data(&self) -> Result<(), StorageError> {
        self.notes.clear_all().await
    }

    /// Export is not implemented yet; this only reports whether there is
    /// anything to export.
    pub async fn export_data(&self) -> Result<ExportStatus, StorageError> {
        let stored = self
            .kv
            .get(notes::NOTES_KEY)
            .await
            .map_err(|source| StorageError::Medium {
                op: StorageOp::Get,
                key: notes::NOTES_KEY.to_string(),
                source,
            })?;

        Ok(match stored {
            Some(raw) if !raw.is_empty() => ExportStatus::ComingSoon,
            _ => ExportStatus::NoData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 20, 21, 0, 0).unwrap()
    }

    fn memory_app() -> App {
        App::with_store(Arc::new(MemoryStore::new()), StatsConfig::default())
    }

    #[tokio::test]
    async fn test_empty_dashboard() {
        let app = memory_app();
        let dashboard = app.dashboard(now()).await.unwrap();

        assert_eq!(dashboard.split, OverallSplit::default());
        assert_eq!(dashboard.weekly, WeeklyCounts::default());
        assert_eq!(dashboard.progress, WeeklyProgress::default());
    }

    #[tokio::test]
    async fn test_dashboard_reflects_mutations() {
        let app = memory_app();
        let notes = app.notes();

        for i in 0..3 {
            notes
                .add_at(
                    EncounterDraft::new(format!("a{i}"), EncounterStatus::Accepted),
                    now() - Duration::days(1),
                )
                .await
                .unwrap();
        }
        notes
            .add_at(
                EncounterDraft::new("r", EncounterStatus::Rejected),
                now() - Duration::days(10),
            )
            .await
            .unwrap();

        let dashboard = app.dashboard(now()).await.unwrap();
        assert_eq!(dashboard.split.total, 4);
        assert_eq!(dashboard.split.accepted_pct, 75);
        assert_eq!(dashboard.split.rejected_pct, 25);
        assert_eq!(dashboard.counts.accepted, 3);
        assert_eq!(
            dashboard.weekly,
            WeeklyCounts {
                approaches: 3,
                rejects: 0,
                accepts: 3
            }
        );
        assert_eq!(dashboard.progress.approaches_pct, 30);
    }

    #[tokio::test]
    async fn test_export_reports_status() {
        let app = memory_app();
        assert_eq!(app.export_data().await.unwrap(), ExportStatus::NoData);

        app.notes()
            .add(EncounterDraft::new("x", EncounterStatus::Accepted))
            .await
            .unwrap();
        assert_eq!(app.export_data().await.unwrap(), ExportStatus::ComingSoon);

        app.clear_all_data().await.unwrap();
        assert_eq!(app.export_data().await.unwrap(), ExportStatus::NoData);
    }
}
