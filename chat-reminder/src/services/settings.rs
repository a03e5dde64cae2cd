//! Settings service
//!
//! Reminder settings with per-key defaults, a typed change type, and two
//! stores: a JSON file store with debounced writes and an in-memory store
//! for hosts that persist settings themselves.

use crate::config::{DEFAULT_DEBOUNCE_SECONDS, SETTINGS_SAVE_DEBOUNCE_MS};
use crate::error::{ReminderError, Result};
use crate::platform::PlatformOverride;
use crate::services::audio::SoundSlot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How successive desktop notifications behave on mobile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MobileNotifyBehavior {
    /// New notifications replace the previous one
    #[default]
    Replace,
    /// Every notification is kept
    Stack,
}

/// A user-supplied sound stored inline as a data URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSound {
    pub data_url: String,
    /// Original file name, shown in the settings panel
    pub filename: String,
}

/// Reminder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    /// Tab title flash (desktop only)
    #[serde(default = "default_true")]
    pub enable_reminder: bool,
    /// Desktop notification and its paired sound cue
    #[serde(default = "default_true")]
    pub enable_notification: bool,
    #[serde(default = "default_true")]
    pub enable_error_sound: bool,
    /// Device vibration (mobile only)
    #[serde(default = "default_true")]
    pub enable_vibration: bool,
    /// Minimum spacing between loud reminders, 0 disables the gate
    #[serde(default = "default_debounce_seconds")]
    pub notification_debounce_seconds: u32,
    #[serde(default)]
    pub platform_override: PlatformOverride,
    #[serde(default)]
    pub mobile_notification_behavior: MobileNotifyBehavior,
    #[serde(default)]
    pub notification_sound: Option<CustomSound>,
    #[serde(default)]
    pub error_sound: Option<CustomSound>,
}

fn default_true() -> bool {
    true
}

fn default_debounce_seconds() -> u32 {
    DEFAULT_DEBOUNCE_SECONDS
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enable_reminder: true,
            enable_notification: true,
            enable_error_sound: true,
            enable_vibration: true,
            notification_debounce_seconds: default_debounce_seconds(),
            platform_override: PlatformOverride::default(),
            mobile_notification_behavior: MobileNotifyBehavior::default(),
            notification_sound: None,
            error_sound: None,
        }
    }
}

impl ReminderSettings {
    /// User sound configured for a slot
    pub fn sound(&self, slot: SoundSlot) -> Option<&CustomSound> {
        match slot {
            SoundSlot::Notification => self.notification_sound.as_ref(),
            SoundSlot::Error => self.error_sound.as_ref(),
        }
    }

    /// Master switch governing a sound slot
    pub fn slot_enabled(&self, slot: SoundSlot) -> bool {
        match slot {
            SoundSlot::Notification => self.enable_notification,
            SoundSlot::Error => self.enable_error_sound,
        }
    }

    pub fn apply(&mut self, change: SettingChange) {
        match change {
            SettingChange::ReminderEnabled(v) => self.enable_reminder = v,
            SettingChange::NotificationEnabled(v) => self.enable_notification = v,
            SettingChange::ErrorSoundEnabled(v) => self.enable_error_sound = v,
            SettingChange::VibrationEnabled(v) => self.enable_vibration = v,
            SettingChange::DebounceSeconds(v) => self.notification_debounce_seconds = v,
            SettingChange::PlatformOverride(v) => self.platform_override = v,
            SettingChange::MobileBehavior(v) => self.mobile_notification_behavior = v,
            SettingChange::Sound(SoundSlot::Notification, v) => self.notification_sound = v,
            SettingChange::Sound(SoundSlot::Error, v) => self.error_sound = v,
        }
    }
}

/// A single settings edit
#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    ReminderEnabled(bool),
    NotificationEnabled(bool),
    ErrorSoundEnabled(bool),
    VibrationEnabled(bool),
    DebounceSeconds(u32),
    PlatformOverride(PlatformOverride),
    MobileBehavior(MobileNotifyBehavior),
    Sound(SoundSlot, Option<CustomSound>),
}

impl SettingChange {
    /// Log-safe description; sound payloads are never printed
    fn describe(&self) -> String {
        match self {
            SettingChange::ReminderEnabled(v) => format!("enableReminder = {}", v),
            SettingChange::NotificationEnabled(v) => format!("enableNotification = {}", v),
            SettingChange::ErrorSoundEnabled(v) => format!("enableErrorSound = {}", v),
            SettingChange::VibrationEnabled(v) => format!("enableVibration = {}", v),
            SettingChange::DebounceSeconds(v) => format!("notificationDebounceSeconds = {}", v),
            SettingChange::PlatformOverride(v) => format!("platformOverride = {:?}", v),
            SettingChange::MobileBehavior(v) => format!("mobileNotificationBehavior = {:?}", v),
            SettingChange::Sound(slot, Some(sound)) => {
                format!("{} sound = <data url> ({})", slot, sound.filename)
            }
            SettingChange::Sound(slot, None) => format!("{} sound = default", slot),
        }
    }
}

/// Parse a debounce value typed into the settings panel.
///
/// Takes the leading integer like a lenient text field would; anything
/// unparsable or negative becomes 0.
pub fn parse_debounce_seconds(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();

    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(u32::MAX)
}

/// Key-value settings store consulted by every reminder channel
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Current settings
    async fn snapshot(&self) -> ReminderSettings;

    /// Apply one change and persist it
    async fn apply(&self, change: SettingChange) -> Result<ReminderSettings>;
}

/// Settings kept in memory only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<ReminderSettings>,
}

impl MemorySettingsStore {
    pub fn new(settings: ReminderSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

#[async_trait]
impl ConfigStore for MemorySettingsStore {
    async fn snapshot(&self) -> ReminderSettings {
        self.settings.lock().await.clone()
    }

    async fn apply(&self, change: SettingChange) -> Result<ReminderSettings> {
        tracing::debug!("Setting {}", change.describe());
        let mut settings = self.settings.lock().await;
        settings.apply(change);
        Ok(settings.clone())
    }
}

/// Settings persisted to `<dir>/<namespace>.json`
pub struct JsonSettingsStore {
    settings_path: PathBuf,
    settings: Arc<Mutex<ReminderSettings>>,
    pending_save: Mutex<Option<JoinHandle<()>>>,
    save_delay: Duration,
}

impl JsonSettingsStore {
    /// Load settings from disk, creating or completing the file with defaults
    pub async fn load(dir: impl AsRef<Path>, namespace: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;
        let settings_path = dir.join(format!("{}.json", namespace));

        let settings = if !fs::try_exists(&settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = ReminderSettings::default();
            write_settings(&settings_path, &default).await?;
            default
        } else {
            let content = fs::read_to_string(&settings_path).await?;
            let raw: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| ReminderError::Settings(format!("Failed to parse settings: {}", e)))?;
            let settings: ReminderSettings = serde_json::from_value(raw.clone())
                .map_err(|e| ReminderError::Settings(format!("Invalid settings: {}", e)))?;

            let missing = missing_keys(&raw)?;
            if !missing.is_empty() {
                tracing::info!("Filling in default settings for {:?}", missing);
                write_settings(&settings_path, &settings).await?;
            }
            settings
        };

        tracing::info!("Settings loaded from {:?}", settings_path);

        Ok(Self {
            settings_path,
            settings: Arc::new(Mutex::new(settings)),
            pending_save: Mutex::new(None),
            save_delay: Duration::from_millis(SETTINGS_SAVE_DEBOUNCE_MS),
        })
    }

    /// Override the write debounce delay
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = delay;
        self
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    /// Write the current settings immediately, cancelling any pending write
    pub async fn flush(&self) -> Result<()> {
        if let Some(pending) = self.pending_save.lock().await.take() {
            pending.abort();
        }
        let snapshot = self.settings.lock().await.clone();
        write_settings(&self.settings_path, &snapshot).await
    }

    async fn schedule_save(&self) {
        let mut pending = self.pending_save.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let settings = Arc::clone(&self.settings);
        let path = self.settings_path.clone();
        let delay = self.save_delay;

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let snapshot = settings.lock().await.clone();
            if let Err(e) = write_settings(&path, &snapshot).await {
                tracing::error!("Failed to save settings: {}", e);
            }
        }));
    }
}

#[async_trait]
impl ConfigStore for JsonSettingsStore {
    async fn snapshot(&self) -> ReminderSettings {
        self.settings.lock().await.clone()
    }

    async fn apply(&self, change: SettingChange) -> Result<ReminderSettings> {
        tracing::info!("Saving setting {}", change.describe());
        let updated = {
            let mut settings = self.settings.lock().await;
            settings.apply(change);
            settings.clone()
        };
        self.schedule_save().await;
        Ok(updated)
    }
}

async fn write_settings(path: &Path, settings: &ReminderSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| ReminderError::Settings(format!("Failed to serialize settings: {}", e)))?;

    fs::write(path, content).await?;
    tracing::debug!("Settings saved to {:?}", path);

    Ok(())
}

/// Default keys absent from a stored settings object
fn missing_keys(raw: &serde_json::Value) -> Result<Vec<String>> {
    let defaults = serde_json::to_value(ReminderSettings::default())?;
    let stored = raw
        .as_object()
        .ok_or_else(|| ReminderError::Settings("Settings file is not a JSON object".to_string()))?;

    Ok(defaults
        .as_object()
        .map(|keys| {
            keys.keys()
                .filter(|key| !stored.contains_key(key.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default())
}
