use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::storage::{KeyValueStore, Slot, StorageError};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const SETTINGS_KEY: &str = "app_settings";

const MIN_CONFIDENCE: u8 = 1;
const MAX_CONFIDENCE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub notifications: bool,
    pub dark_mode: bool,
    pub auto_backup: bool,
    pub show_confidence_in_list: bool,
    pub default_confidence_level: u8,
    pub reminder_enabled: bool,
    pub privacy_mode: bool,
    /// Keys written by other clients, carried through every save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            dark_mode: true,
            auto_backup: false,
            show_confidence_in_list: true,
            default_confidence_level: 5,
            reminder_enabled: false,
            privacy_mode: false,
            extra: Map::new(),
        }
    }
}

/// The boolean switches on the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingToggle {
    Notifications,
    DarkMode,
    AutoBackup,
    ShowConfidenceInList,
    ReminderEnabled,
    PrivacyMode,
}

impl AppSettings {
    fn flag_mut(&mut self, toggle: SettingToggle) -> &mut bool {
        match toggle {
            SettingToggle::Notifications => &mut self.notifications,
            SettingToggle::DarkMode => &mut self.dark_mode,
            SettingToggle::AutoBackup => &mut self.auto_backup,
            SettingToggle::ShowConfidenceInList => &mut self.show_confidence_in_list,
            SettingToggle::ReminderEnabled => &mut self.reminder_enabled,
            SettingToggle::PrivacyMode => &mut self.privacy_mode,
        }
    }

    pub fn flag(&self, toggle: SettingToggle) -> bool {
        match toggle {
            SettingToggle::Notifications => self.notifications,
            SettingToggle::DarkMode => self.dark_mode,
            SettingToggle::AutoBackup => self.auto_backup,
            SettingToggle::ShowConfidenceInList => self.show_confidence_in_list,
            SettingToggle::ReminderEnabled => self.reminder_enabled,
            SettingToggle::PrivacyMode => self.privacy_mode,
        }
    }
}

/// Preferences under [`SETTINGS_KEY`], cached after the first load. The
/// cache only changes once a write has succeeded.
pub struct SettingsStore {
    slot: Slot<AppSettings>,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            slot: Slot::new(kv, SETTINGS_KEY),
            data: RwLock::new(AppSettings::default()),
        }
    }

    /// Read the stored settings into the cache. Missing or undecodable
    /// settings fall back to the defaults.
    pub async fn load(&self) -> Result<AppSettings, StorageError> {
        let settings = match self.slot.read().await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(err) if err.is_decode() => {
                log_warn!("Using default settings, stored value is unreadable: {err}");
                AppSettings::default()
            }
            Err(err) => return Err(err),
        };

        *self.data.write().await = settings.clone();
        Ok(settings)
    }

    pub async fn reload(&self) -> Result<AppSettings, StorageError> {
        self.load().await
    }

    pub async fn current(&self) -> AppSettings {
        self.data.read().await.clone()
    }

    pub async fn update(&self, settings: AppSettings) -> Result<(), StorageError> {
        let mut guard = self.data.write().await;
        self.slot.write(&settings).await?;
        *guard = settings;
        Ok(())
    }

    /// Flip one switch and persist. Returns the new value.
    pub async fn toggle(&self, toggle: SettingToggle) -> Result<bool, StorageError> {
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        let flag = next.flag_mut(toggle);
        *flag = !*flag;
        let value = *flag;

        self.slot.write(&next).await?;
        *guard = next;
        Ok(value)
    }

    /// Set the confidence level prefilled in new drafts, clamped to 1-10.
    pub async fn set_default_confidence(&self, level: u8) -> Result<u8, StorageError> {
        let level = level.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
        let mut guard = self.data.write().await;
        let mut next = guard.clone();
        next.default_confidence_level = level;

        self.slot.write(&next).await?;
        *guard = next;
        Ok(level)
    }
}
