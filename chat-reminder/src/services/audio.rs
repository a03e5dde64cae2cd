//! Audio cues
//!
//! Two independent sound slots (notification and error). Each slot plays
//! a built-in sound unless the user uploaded one.

use crate::config::{
    AUDIO_MIME_PREFIX, DEFAULT_ERROR_SOUND_PATH, DEFAULT_NOTIFICATION_SOUND_PATH, DEFAULT_VOLUME,
    MAX_SOUND_FILE_BYTES,
};
use crate::error::{ReminderError, Result};
use crate::services::settings::{ConfigStore, CustomSound};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundSlot {
    Notification,
    Error,
}

impl SoundSlot {
    pub const ALL: [SoundSlot; 2] = [SoundSlot::Notification, SoundSlot::Error];

    pub fn default_path(self) -> &'static str {
        match self {
            SoundSlot::Notification => DEFAULT_NOTIFICATION_SOUND_PATH,
            SoundSlot::Error => DEFAULT_ERROR_SOUND_PATH,
        }
    }
}

impl fmt::Display for SoundSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundSlot::Notification => f.write_str("notification"),
            SoundSlot::Error => f.write_str("error"),
        }
    }
}

/// What a sound slot points at
#[derive(Debug, Clone)]
pub enum SoundSource {
    Builtin(&'static str),
    Custom {
        data_url: Arc<str>,
        /// Truncated SHA-256 of the data URL
        fingerprint: String,
    },
}

impl SoundSource {
    pub fn builtin(slot: SoundSlot) -> Self {
        SoundSource::Builtin(slot.default_path())
    }

    pub fn custom(sound: &CustomSound) -> Self {
        SoundSource::Custom {
            fingerprint: fingerprint(&sound.data_url),
            data_url: Arc::from(sound.data_url.as_str()),
        }
    }

    /// The user sound if one is set, otherwise the slot default
    pub fn resolve(slot: SoundSlot, custom: Option<&CustomSound>) -> Self {
        match custom {
            Some(sound) if !sound.data_url.is_empty() => SoundSource::custom(sound),
            _ => SoundSource::builtin(slot),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, SoundSource::Builtin(_))
    }

    /// Path or data URL handed to the player
    pub fn location(&self) -> &str {
        match self {
            SoundSource::Builtin(path) => path,
            SoundSource::Custom { data_url, .. } => data_url,
        }
    }
}

impl PartialEq for SoundSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SoundSource::Builtin(a), SoundSource::Builtin(b)) => a == b,
            (SoundSource::Custom { fingerprint: a, .. }, SoundSource::Custom { fingerprint: b, .. }) => {
                a == b
            }
            _ => false,
        }
    }
}

impl Eq for SoundSource {}

impl fmt::Display for SoundSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundSource::Builtin(path) => write!(f, "default ({})", path),
            SoundSource::Custom { fingerprint, .. } => write!(f, "custom (sha256:{})", fingerprint),
        }
    }
}

fn fingerprint(data: &str) -> String {
    Sha256::digest(data.as_bytes())
        .iter()
        .take(8)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Audio output for the two sound slots
#[async_trait]
pub trait SoundPlayer: Send + Sync {
    fn set_source(&self, slot: SoundSlot, source: &SoundSource) -> Result<()>;

    fn set_volume(&self, slot: SoundSlot, volume: f32);

    /// Seek the slot back to the start
    fn rewind(&self, slot: SoundSlot);

    /// Start playback. Resolves once playback has started, not when it ends.
    async fn play(&self, slot: SoundSlot) -> Result<()>;
}

/// A sound file picked by the user
#[derive(Debug, Clone)]
pub struct SoundUpload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SoundUpload {
    pub fn validate(&self) -> Result<()> {
        if !self.mime_type.starts_with(AUDIO_MIME_PREFIX) {
            return Err(ReminderError::InvalidSound(format!(
                "{} is not an audio file ({})",
                self.filename, self.mime_type
            )));
        }
        if self.bytes.len() as u64 > MAX_SOUND_FILE_BYTES {
            return Err(ReminderError::InvalidSound(format!(
                "{} is larger than {} MB",
                self.filename,
                MAX_SOUND_FILE_BYTES / (1024 * 1024)
            )));
        }
        Ok(())
    }

    /// Validate and encode as an inline data URL
    pub fn into_custom_sound(self) -> Result<CustomSound> {
        self.validate()?;
        let data_url = format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes));
        Ok(CustomSound {
            data_url,
            filename: self.filename,
        })
    }
}

/// Audio emitter owning the current source of each slot
pub struct AudioEmitter {
    player: Arc<dyn SoundPlayer>,
    store: Arc<dyn ConfigStore>,
    sources: Mutex<HashMap<SoundSlot, SoundSource>>,
}

impl AudioEmitter {
    pub fn new(player: Arc<dyn SoundPlayer>, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            player,
            store,
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Set volumes and load the configured sources
    pub async fn init(&self) {
        let settings = self.store.snapshot().await;
        for slot in SoundSlot::ALL {
            self.player.set_volume(slot, DEFAULT_VOLUME);
            self.set_source(slot, settings.sound(slot)).await;
        }
        tracing::info!("Audio initialized");
    }

    pub async fn current_source(&self, slot: SoundSlot) -> Option<SoundSource> {
        self.sources.lock().await.get(&slot).cloned()
    }

    /// Point a slot at the user sound, or at its default when `None`.
    ///
    /// Returns false when the slot already had that source. A failed
    /// assignment falls back to the default source.
    pub async fn set_source(&self, slot: SoundSlot, custom: Option<&CustomSound>) -> bool {
        let desired = SoundSource::resolve(slot, custom);
        let mut sources = self.sources.lock().await;

        if sources.get(&slot) == Some(&desired) {
            return false;
        }

        match self.player.set_source(slot, &desired) {
            Ok(()) => {
                tracing::info!("{} sound set to {}", slot, desired);
                sources.insert(slot, desired);
            }
            Err(e) => {
                tracing::error!("Failed to set {} sound to {}: {}", slot, desired, e);
                let fallback = SoundSource::builtin(slot);
                match self.player.set_source(slot, &fallback) {
                    Ok(()) => {
                        sources.insert(slot, fallback);
                    }
                    Err(e) => {
                        tracing::error!("Failed to restore default {} sound: {}", slot, e);
                        sources.remove(&slot);
                    }
                }
            }
        }
        true
    }

    /// Play a slot from the start if its switch is on and it has a source
    pub async fn play(&self, slot: SoundSlot) -> bool {
        if !self.store.snapshot().await.slot_enabled(slot) {
            tracing::debug!("{} sound disabled, not playing", slot);
            return false;
        }
        if !self.sources.lock().await.contains_key(&slot) {
            tracing::warn!("{} sound has no source, not playing", slot);
            return false;
        }

        self.player.rewind(slot);
        match self.player.play(slot).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to play {} sound: {}", slot, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSoundPlayer;
    use crate::services::settings::{MemorySettingsStore, ReminderSettings, SettingChange};

    fn create_test_emitter(settings: ReminderSettings) -> (AudioEmitter, Arc<MockSoundPlayer>, Arc<MemorySettingsStore>) {
        let player = Arc::new(MockSoundPlayer::new());
        let store = Arc::new(MemorySettingsStore::new(settings));
        let emitter = AudioEmitter::new(player.clone(), store.clone());
        (emitter, player, store)
    }

    fn custom_sound(data: &str) -> CustomSound {
        CustomSound {
            data_url: format!("data:audio/mpeg;base64,{}", data),
            filename: "ding.mp3".to_string(),
        }
    }

    #[tokio::test]
    async fn test_init_sets_volume_and_default_sources() {
        let (emitter, player, _store) = create_test_emitter(ReminderSettings::default());
        emitter.init().await;

        assert_eq!(player.volume(SoundSlot::Notification), Some(DEFAULT_VOLUME));
        assert_eq!(player.volume(SoundSlot::Error), Some(DEFAULT_VOLUME));
        assert_eq!(
            emitter.current_source(SoundSlot::Error).await,
            Some(SoundSource::Builtin(DEFAULT_ERROR_SOUND_PATH))
        );
    }

    #[tokio::test]
    async fn test_init_loads_saved_custom_sound() {
        let settings = ReminderSettings {
            notification_sound: Some(custom_sound("AAAA")),
            ..ReminderSettings::default()
        };
        let (emitter, player, _store) = create_test_emitter(settings);
        emitter.init().await;

        let source = emitter.current_source(SoundSlot::Notification).await.unwrap();
        assert!(!source.is_builtin());
        assert_eq!(
            player.source_location(SoundSlot::Notification).as_deref(),
            Some("data:audio/mpeg;base64,AAAA")
        );
    }

    #[tokio::test]
    async fn test_resetting_to_default_is_idempotent() {
        let (emitter, player, _store) = create_test_emitter(ReminderSettings::default());
        emitter.init().await;
        let assignments = player.source_assignments();

        assert!(!emitter.set_source(SoundSlot::Notification, None).await);
        assert!(!emitter.set_source(SoundSlot::Notification, None).await);
        assert_eq!(player.source_assignments(), assignments);
        assert!(emitter
            .current_source(SoundSlot::Notification)
            .await
            .unwrap()
            .is_builtin());
    }

    #[tokio::test]
    async fn test_failed_assignment_falls_back_to_default() {
        let (emitter, player, _store) = create_test_emitter(ReminderSettings::default());
        emitter.init().await;
        emitter.set_source(SoundSlot::Error, Some(&custom_sound("AAAA"))).await;

        player.reject_custom_sources(true);
        assert!(emitter.set_source(SoundSlot::Error, Some(&custom_sound("BBBB"))).await);

        assert_eq!(
            emitter.current_source(SoundSlot::Error).await,
            Some(SoundSource::builtin(SoundSlot::Error))
        );
        assert_eq!(
            player.source_location(SoundSlot::Error).as_deref(),
            Some(DEFAULT_ERROR_SOUND_PATH)
        );
    }

    #[tokio::test]
    async fn test_play_rewinds_first() {
        let (emitter, player, _store) = create_test_emitter(ReminderSettings::default());
        emitter.init().await;

        assert!(emitter.play(SoundSlot::Notification).await);
        assert!(emitter.play(SoundSlot::Notification).await);
        assert_eq!(player.plays(), vec![SoundSlot::Notification, SoundSlot::Notification]);
        assert_eq!(player.rewinds(SoundSlot::Notification), 2);
    }

    #[tokio::test]
    async fn test_play_respects_slot_switch() {
        let (emitter, player, store) = create_test_emitter(ReminderSettings::default());
        emitter.init().await;
        store
            .apply(SettingChange::ErrorSoundEnabled(false))
            .await
            .unwrap();

        assert!(!emitter.play(SoundSlot::Error).await);
        assert!(player.plays().is_empty());
    }

    #[tokio::test]
    async fn test_play_without_source_is_noop() {
        let (emitter, player, _store) = create_test_emitter(ReminderSettings::default());

        assert!(!emitter.play(SoundSlot::Notification).await);
        assert!(player.plays().is_empty());
    }

    #[tokio::test]
    async fn test_playback_failure_is_absorbed() {
        let (emitter, player, _store) = create_test_emitter(ReminderSettings::default());
        emitter.init().await;
        player.fail_playback(true);

        assert!(!emitter.play(SoundSlot::Notification).await);
    }

    #[test]
    fn test_upload_rejects_non_audio() {
        let upload = SoundUpload {
            filename: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            bytes: b"hello".to_vec(),
        };
        assert!(matches!(upload.validate(), Err(ReminderError::InvalidSound(_))));
    }

    #[test]
    fn test_upload_rejects_oversized_file() {
        let upload = SoundUpload {
            filename: "long.wav".to_string(),
            mime_type: "audio/wav".to_string(),
            bytes: vec![0; 6 * 1024 * 1024],
        };
        assert!(matches!(upload.validate(), Err(ReminderError::InvalidSound(_))));
    }

    #[test]
    fn test_upload_encodes_data_url() {
        let upload = SoundUpload {
            filename: "ding.wav".to_string(),
            mime_type: "audio/wav".to_string(),
            bytes: b"RIFF".to_vec(),
        };
        let sound = upload.into_custom_sound().unwrap();
        assert_eq!(sound.data_url, "data:audio/wav;base64,UklGRg==");
        assert_eq!(sound.filename, "ding.wav");
    }

    #[test]
    fn test_sources_compare_by_content() {
        let a = SoundSource::custom(&custom_sound("AAAA"));
        let b = SoundSource::custom(&custom_sound("AAAA"));
        let c = SoundSource::custom(&custom_sound("BBBB"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, SoundSource::builtin(SoundSlot::Notification));
    }
}
