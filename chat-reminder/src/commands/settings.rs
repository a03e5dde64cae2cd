//! Settings-related commands
//!
//! Plain switch and value edits from the settings panel, plus the status
//! snapshot the panel renders from.

use crate::app::AppState;
use crate::error::Result;
use crate::platform::{PlatformOverride, PlatformTag};
use crate::services::settings::parse_debounce_seconds;
use crate::services::{
    MobileNotifyBehavior, NotificationPermission, ReminderSettings, SettingChange, SoundSlot,
};
use serde::Serialize;

// ===== Switches =====

pub async fn set_reminder_enabled(state: &AppState, enabled: bool) -> Result<()> {
    state
        .dispatcher
        .store()
        .apply(SettingChange::ReminderEnabled(enabled))
        .await?;
    Ok(())
}

pub async fn set_error_sound_enabled(state: &AppState, enabled: bool) -> Result<()> {
    state
        .dispatcher
        .store()
        .apply(SettingChange::ErrorSoundEnabled(enabled))
        .await?;
    Ok(())
}

pub async fn set_vibration_enabled(state: &AppState, enabled: bool) -> Result<()> {
    state
        .dispatcher
        .store()
        .apply(SettingChange::VibrationEnabled(enabled))
        .await?;
    Ok(())
}

// ===== Values =====

/// Store the debounce window typed into the panel. Returns the value kept.
pub async fn set_debounce_seconds(state: &AppState, raw: &str) -> Result<u32> {
    let seconds = parse_debounce_seconds(raw);
    state
        .dispatcher
        .store()
        .apply(SettingChange::DebounceSeconds(seconds))
        .await?;
    Ok(seconds)
}

/// Change the platform override. Returns the new effective platform.
pub async fn set_platform_override(state: &AppState, platform: PlatformOverride) -> Result<PlatformTag> {
    state
        .dispatcher
        .store()
        .apply(SettingChange::PlatformOverride(platform))
        .await?;

    let effective = state.dispatcher.effective_platform().await;
    tracing::info!("Platform override set to {:?}, effective platform: {}", platform, effective);
    Ok(effective)
}

pub async fn set_mobile_notification_behavior(
    state: &AppState,
    behavior: MobileNotifyBehavior,
) -> Result<()> {
    state
        .dispatcher
        .store()
        .apply(SettingChange::MobileBehavior(behavior))
        .await?;
    Ok(())
}

// ===== Status =====

/// Which panel controls are usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    /// Title flash has no effect on mobile
    pub reminder_toggle_disabled: bool,
    /// Debounce and notification sound inputs
    pub notification_controls_disabled: bool,
    pub error_sound_controls_disabled: bool,
    pub show_mobile_settings: bool,
    pub mobile_controls_disabled: bool,
}

impl ControlState {
    pub fn new(settings: &ReminderSettings, is_mobile: bool) -> Self {
        let notification_controls_disabled = !settings.enable_notification;
        Self {
            reminder_toggle_disabled: is_mobile,
            notification_controls_disabled,
            error_sound_controls_disabled: !settings.enable_error_sound,
            show_mobile_settings: is_mobile,
            mobile_controls_disabled: notification_controls_disabled || !is_mobile,
        }
    }
}

/// Everything the settings panel shows besides the raw settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatus {
    pub detected_platform: PlatformTag,
    pub effective_platform: PlatformTag,
    pub is_mobile: bool,
    /// "(Detected: Android)" while the override is `auto`
    pub detected_label: Option<String>,
    pub permission: NotificationPermission,
    pub notification_sound_name: String,
    pub error_sound_name: String,
    pub controls: ControlState,
}

fn sound_name(settings: &ReminderSettings, slot: SoundSlot) -> String {
    settings
        .sound(slot)
        .map(|sound| sound.filename.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Default".to_string())
}

pub async fn get_status(state: &AppState) -> ReminderStatus {
    let dispatcher = &state.dispatcher;
    let settings = dispatcher.store().snapshot().await;
    let detected = dispatcher.detected_platform();
    let effective = dispatcher.effective_platform().await;
    let is_mobile = effective.is_mobile();

    let detected_label = (settings.platform_override == PlatformOverride::Auto
        && detected != PlatformTag::Unknown)
        .then(|| format!("(Detected: {})", detected.label()));

    ReminderStatus {
        detected_platform: detected,
        effective_platform: effective,
        is_mobile,
        detected_label,
        permission: dispatcher.notifications().check_permission(),
        notification_sound_name: sound_name(&settings, SoundSlot::Notification),
        error_sound_name: sound_name(&settings, SoundSlot::Error),
        controls: ControlState::new(&settings, is_mobile),
    }
}
