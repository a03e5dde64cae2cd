//! Desktop notifications
//!
//! Wraps the platform notification capability: support probe, permission
//! handling and platform-dependent notification options. A shown
//! notification also plays the notification sound cue.

use crate::config::{NOTIFICATION_ICON, NOTIFICATION_TAG};
use crate::error::Result;
use crate::platform::PlatformClassifier;
use crate::services::audio::{AudioEmitter, SoundSlot};
use crate::services::settings::{ConfigStore, MobileNotifyBehavior};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Notification permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// Not requested yet
    Default,
}

/// Options passed to the platform when creating a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    /// Suppress the platform's own sound; the notification cue replaces it
    pub silent: bool,
    /// Notifications sharing a tag replace each other
    pub tag: Option<String>,
    pub renotify: Option<bool>,
}

/// Caller overrides applied on top of the computed options
#[derive(Debug, Clone, Default)]
pub struct NotificationOverrides {
    pub icon: Option<String>,
    pub silent: Option<bool>,
    pub tag: Option<Option<String>>,
    pub renotify: Option<Option<bool>>,
}

impl NotificationOverrides {
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(Some(tag.into())),
            ..Self::default()
        }
    }

    fn apply_to(self, options: &mut NotificationOptions) {
        if let Some(icon) = self.icon {
            options.icon = icon;
        }
        if let Some(silent) = self.silent {
            options.silent = silent;
        }
        if let Some(tag) = self.tag {
            options.tag = tag;
        }
        if let Some(renotify) = self.renotify {
            options.renotify = renotify;
        }
    }
}

/// A notification that was handed to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

/// Platform notification capability
#[async_trait]
pub trait SystemNotifier: Send + Sync {
    fn is_supported(&self) -> bool;

    fn permission(&self) -> NotificationPermission;

    /// Prompt the user. Resolves with the resulting permission.
    async fn request_permission(&self) -> Result<NotificationPermission>;

    fn show(&self, title: &str, options: &NotificationOptions) -> Result<()>;
}

/// Build the options for a message notification
pub fn notification_options(
    body: &str,
    is_mobile: bool,
    behavior: MobileNotifyBehavior,
) -> NotificationOptions {
    let mut options = NotificationOptions {
        body: body.to_string(),
        icon: NOTIFICATION_ICON.to_string(),
        silent: true,
        tag: None,
        renotify: None,
    };

    if !is_mobile || behavior == MobileNotifyBehavior::Replace {
        options.tag = Some(NOTIFICATION_TAG.to_string());
        options.renotify = Some(false);
    }

    options
}

pub struct DesktopNotifier {
    notifier: Arc<dyn SystemNotifier>,
    platform: Arc<dyn PlatformClassifier>,
    store: Arc<dyn ConfigStore>,
    audio: Arc<AudioEmitter>,
    unsupported_logged: AtomicBool,
}

impl DesktopNotifier {
    pub fn new(
        notifier: Arc<dyn SystemNotifier>,
        platform: Arc<dyn PlatformClassifier>,
        store: Arc<dyn ConfigStore>,
        audio: Arc<AudioEmitter>,
    ) -> Self {
        Self {
            notifier,
            platform,
            store,
            audio,
            unsupported_logged: AtomicBool::new(false),
        }
    }

    pub fn check_support(&self) -> bool {
        let supported = self.notifier.is_supported();
        if !supported && !self.unsupported_logged.swap(true, Ordering::Relaxed) {
            tracing::warn!("Desktop notifications are not supported in this environment");
        }
        supported
    }

    /// Current permission; an unsupported environment reports `Denied`
    pub fn check_permission(&self) -> NotificationPermission {
        if !self.notifier.is_supported() {
            return NotificationPermission::Denied;
        }
        self.notifier.permission()
    }

    /// Ask for permission. Returns true only when granted.
    ///
    /// Does not prompt when the answer is already known.
    pub async fn request_permission(&self) -> bool {
        if !self.check_support() {
            return false;
        }

        match self.notifier.permission() {
            NotificationPermission::Granted => return true,
            NotificationPermission::Denied => return false,
            NotificationPermission::Default => {}
        }

        match self.notifier.request_permission().await {
            Ok(permission) => {
                tracing::info!("Notification permission request result: {:?}", permission);
                permission == NotificationPermission::Granted
            }
            Err(e) => {
                tracing::error!("Notification permission request failed: {}", e);
                false
            }
        }
    }

    /// Show a notification and play the notification cue.
    ///
    /// Returns `None` without side effects when notifications are switched
    /// off, unsupported, or not permitted, or when creation fails.
    pub async fn send(
        &self,
        title: &str,
        body: &str,
        overrides: NotificationOverrides,
    ) -> Option<Notification> {
        let settings = self.store.snapshot().await;
        if !settings.enable_notification
            || !self.check_support()
            || self.notifier.permission() != NotificationPermission::Granted
        {
            return None;
        }

        let platform = self.platform.effective(settings.platform_override);
        let mut options = notification_options(
            body,
            platform.is_mobile(),
            settings.mobile_notification_behavior,
        );
        overrides.apply_to(&mut options);

        tracing::debug!(
            "Showing {} notification \"{}\" (tag: {:?})",
            platform,
            title,
            options.tag
        );

        if let Err(e) = self.notifier.show(title, &options) {
            tracing::error!("Failed to show notification: {}", e);
            let permission = self.notifier.permission();
            if permission != NotificationPermission::Granted {
                tracing::warn!("Notification permission is now {:?}", permission);
            }
            return None;
        }

        self.audio.play(SoundSlot::Notification).await;

        Some(Notification {
            title: title.to_string(),
            options,
        })
    }
}
