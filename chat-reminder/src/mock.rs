//! In-memory capability providers
//!
//! Stand-ins for the host page, notification, audio, vibration and toast
//! capabilities. They record every call so tests can assert on them, and
//! let a host dry-run the reminder engine without a browser.

use crate::error::{ReminderError, Result};
use crate::services::audio::{SoundPlayer, SoundSlot, SoundSource};
use crate::services::notifications::{
    Notification, NotificationOptions, NotificationPermission, SystemNotifier,
};
use crate::services::title_flash::PageSurface;
use crate::services::toast::{ToastLevel, Toaster};
use crate::services::vibration::{VibrationPattern, Vibrator};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ===== Page =====

pub struct MockPage {
    title: Mutex<String>,
    hidden: Mutex<bool>,
    focused: Mutex<bool>,
}

impl MockPage {
    /// A visible, focused page with the given title
    pub fn new(title: &str) -> Self {
        Self {
            title: Mutex::new(title.to_string()),
            hidden: Mutex::new(false),
            focused: Mutex::new(true),
        }
    }

    pub fn set_hidden(&self, hidden: bool) {
        *lock(&self.hidden) = hidden;
    }

    pub fn set_focused(&self, focused: bool) {
        *lock(&self.focused) = focused;
    }

    /// Hide and blur the page in one go
    pub fn background(&self) {
        self.set_hidden(true);
        self.set_focused(false);
    }

    /// Show and focus the page in one go
    pub fn foreground(&self) {
        self.set_hidden(false);
        self.set_focused(true);
    }
}

impl PageSurface for MockPage {
    fn title(&self) -> String {
        lock(&self.title).clone()
    }

    fn set_title(&self, title: &str) {
        *lock(&self.title) = title.to_string();
    }

    fn is_hidden(&self) -> bool {
        *lock(&self.hidden)
    }

    fn has_focus(&self) -> bool {
        *lock(&self.focused)
    }
}

// ===== Notifications =====

pub struct MockNotifier {
    supported: Mutex<bool>,
    permission: Mutex<NotificationPermission>,
    request_answer: Mutex<NotificationPermission>,
    fail_requests: Mutex<bool>,
    fail_show: Mutex<bool>,
    requests: Mutex<usize>,
    shown: Mutex<Vec<Notification>>,
}

impl MockNotifier {
    /// Supported notifier with the given permission. Prompts are dismissed
    /// (answer `Default`) until [`answer_requests_with`](Self::answer_requests_with).
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            supported: Mutex::new(true),
            permission: Mutex::new(permission),
            request_answer: Mutex::new(NotificationPermission::Default),
            fail_requests: Mutex::new(false),
            fail_show: Mutex::new(false),
            requests: Mutex::new(0),
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn set_supported(&self, supported: bool) {
        *lock(&self.supported) = supported;
    }

    pub fn set_permission(&self, permission: NotificationPermission) {
        *lock(&self.permission) = permission;
    }

    pub fn answer_requests_with(&self, permission: NotificationPermission) {
        *lock(&self.request_answer) = permission;
    }

    pub fn fail_requests(&self, fail: bool) {
        *lock(&self.fail_requests) = fail;
    }

    pub fn fail_show(&self, fail: bool) {
        *lock(&self.fail_show) = fail;
    }

    pub fn permission_requests(&self) -> usize {
        *lock(&self.requests)
    }

    pub fn shown(&self) -> Vec<Notification> {
        lock(&self.shown).clone()
    }
}

#[async_trait]
impl SystemNotifier for MockNotifier {
    fn is_supported(&self) -> bool {
        *lock(&self.supported)
    }

    fn permission(&self) -> NotificationPermission {
        *lock(&self.permission)
    }

    async fn request_permission(&self) -> Result<NotificationPermission> {
        *lock(&self.requests) += 1;
        if *lock(&self.fail_requests) {
            return Err(ReminderError::Notification("permission prompt failed".to_string()));
        }
        let answer = *lock(&self.request_answer);
        *lock(&self.permission) = answer;
        Ok(answer)
    }

    fn show(&self, title: &str, options: &NotificationOptions) -> Result<()> {
        if *lock(&self.fail_show) {
            return Err(ReminderError::Notification("notification construction failed".to_string()));
        }
        lock(&self.shown).push(Notification {
            title: title.to_string(),
            options: options.clone(),
        });
        Ok(())
    }
}

// ===== Audio =====

#[derive(Default)]
pub struct MockSoundPlayer {
    sources: Mutex<HashMap<SoundSlot, String>>,
    volumes: Mutex<HashMap<SoundSlot, f32>>,
    rewinds: Mutex<HashMap<SoundSlot, usize>>,
    assignments: Mutex<usize>,
    reject_custom: Mutex<bool>,
    fail_playback: Mutex<bool>,
    plays: Mutex<Vec<SoundSlot>>,
}

impl MockSoundPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make assignments of user sounds fail (built-in paths still load)
    pub fn reject_custom_sources(&self, reject: bool) {
        *lock(&self.reject_custom) = reject;
    }

    pub fn fail_playback(&self, fail: bool) {
        *lock(&self.fail_playback) = fail;
    }

    pub fn source_location(&self, slot: SoundSlot) -> Option<String> {
        lock(&self.sources).get(&slot).cloned()
    }

    pub fn volume(&self, slot: SoundSlot) -> Option<f32> {
        lock(&self.volumes).get(&slot).copied()
    }

    pub fn rewinds(&self, slot: SoundSlot) -> usize {
        lock(&self.rewinds).get(&slot).copied().unwrap_or(0)
    }

    /// Successful source assignments so far
    pub fn source_assignments(&self) -> usize {
        *lock(&self.assignments)
    }

    pub fn plays(&self) -> Vec<SoundSlot> {
        lock(&self.plays).clone()
    }
}

#[async_trait]
impl SoundPlayer for MockSoundPlayer {
    fn set_source(&self, slot: SoundSlot, source: &SoundSource) -> Result<()> {
        if !source.is_builtin() && *lock(&self.reject_custom) {
            return Err(ReminderError::Audio("unsupported audio data".to_string()));
        }
        lock(&self.sources).insert(slot, source.location().to_string());
        *lock(&self.assignments) += 1;
        Ok(())
    }

    fn set_volume(&self, slot: SoundSlot, volume: f32) {
        lock(&self.volumes).insert(slot, volume);
    }

    fn rewind(&self, slot: SoundSlot) {
        *lock(&self.rewinds).entry(slot).or_insert(0) += 1;
    }

    async fn play(&self, slot: SoundSlot) -> Result<()> {
        if *lock(&self.fail_playback) {
            return Err(ReminderError::Audio("playback requires a user gesture".to_string()));
        }
        lock(&self.plays).push(slot);
        Ok(())
    }
}

// ===== Vibration =====

pub struct MockVibrator {
    supported: Mutex<bool>,
    fail: Mutex<bool>,
    patterns: Mutex<Vec<VibrationPattern>>,
}

impl MockVibrator {
    pub fn new() -> Self {
        Self {
            supported: Mutex::new(true),
            fail: Mutex::new(false),
            patterns: Mutex::new(Vec::new()),
        }
    }

    pub fn set_supported(&self, supported: bool) {
        *lock(&self.supported) = supported;
    }

    pub fn fail(&self, fail: bool) {
        *lock(&self.fail) = fail;
    }

    pub fn patterns(&self) -> Vec<VibrationPattern> {
        lock(&self.patterns).clone()
    }
}

impl Default for MockVibrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Vibrator for MockVibrator {
    fn is_supported(&self) -> bool {
        *lock(&self.supported)
    }

    fn vibrate(&self, pattern: &VibrationPattern) -> Result<()> {
        if *lock(&self.fail) {
            return Err(ReminderError::Vibration("vibration blocked".to_string()));
        }
        lock(&self.patterns).push(pattern.clone());
        Ok(())
    }
}

// ===== Toasts =====

#[derive(Default)]
pub struct MockToaster {
    messages: Mutex<Vec<(ToastLevel, String)>>,
}

impl MockToaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(ToastLevel, String)> {
        lock(&self.messages).clone()
    }

    pub fn count(&self, level: ToastLevel) -> usize {
        lock(&self.messages)
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

impl Toaster for MockToaster {
    fn show(&self, level: ToastLevel, message: &str) {
        lock(&self.messages).push((level, message.to_string()));
    }
}
