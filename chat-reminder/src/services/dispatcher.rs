//! Reminder dispatcher
//!
//! Decides, for each incoming message, which reminder channels fire:
//!
//! 1. Nothing happens while the page has attention (visible and focused).
//! 2. The title flash runs next. It is not subject to the debounce gate, so
//!    a long burst of messages keeps the tab flagged.
//! 3. The debounce gate decides whether the loud channels (notification,
//!    its sound cue, vibration) fire. The gate timestamp is taken before
//!    any of them run.
//!
//! The manual test trigger shares the gate and the notification/sound
//! pairing but skips the attention check and the title flash.

use crate::clock::Clock;
use crate::config::{
    DEFAULT_NOTIFICATION_BODY, DEFAULT_NOTIFICATION_TITLE, TEST_NOTIFICATION_BODY,
    TEST_NOTIFICATION_TAG, TEST_NOTIFICATION_TITLE,
};
use crate::platform::{PlatformClassifier, PlatformTag};
use crate::services::audio::{AudioEmitter, SoundPlayer};
use crate::services::debounce::DebounceGate;
use crate::services::notifications::{
    DesktopNotifier, Notification, NotificationOverrides, NotificationPermission, SystemNotifier,
};
use crate::services::settings::{ConfigStore, SettingChange};
use crate::services::title_flash::{FlashOutcome, PageSurface, TitleFlasher};
use crate::services::toast::Toaster;
use crate::services::vibration::{VibrationEmitter, VibrationPattern, Vibrator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A fully received chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub id: Uuid,
    /// Arrival time in milliseconds since the Unix epoch
    pub received_at_ms: u64,
}

impl MessageEvent {
    pub fn new(received_at_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at_ms,
        }
    }

    pub fn now(clock: &dyn Clock) -> Self {
        Self::new(clock.now_ms())
    }
}

/// Capability providers injected into the dispatcher
#[derive(Clone)]
pub struct Providers {
    pub store: Arc<dyn ConfigStore>,
    pub platform: Arc<dyn PlatformClassifier>,
    pub page: Arc<dyn PageSurface>,
    pub notifier: Arc<dyn SystemNotifier>,
    pub player: Arc<dyn SoundPlayer>,
    pub vibrator: Arc<dyn Vibrator>,
    pub toaster: Arc<dyn Toaster>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The user is looking at the page
    AttentionPresent,
    /// Inside the debounce window; only the title flash ran
    Debounced,
    /// The loud channels were attempted
    Fired,
}

/// What one dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcome: DispatchOutcome,
    /// `None` when the title flash was not attempted
    pub title_flash: Option<FlashOutcome>,
    pub notification: Option<Notification>,
    pub vibrated: bool,
}

impl DispatchReport {
    fn new(outcome: DispatchOutcome) -> Self {
        Self {
            outcome,
            title_flash: None,
            notification: None,
            vibrated: false,
        }
    }
}

/// Result of the manual permission test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionTestOutcome {
    Unsupported,
    /// Permission was denied earlier; notifications were switched off
    Denied,
    /// The prompt was refused or dismissed; notifications were switched off
    NotGranted,
    /// Permitted, but inside the debounce window
    Debounced,
    Sent(Notification),
    /// Permitted, but the notification could not be shown
    SendFailed,
}

pub struct ReminderDispatcher {
    store: Arc<dyn ConfigStore>,
    platform: Arc<dyn PlatformClassifier>,
    page: Arc<dyn PageSurface>,
    toaster: Arc<dyn Toaster>,
    clock: Arc<dyn Clock>,
    gate: DebounceGate,
    title_flash: TitleFlasher,
    notifications: DesktopNotifier,
    audio: Arc<AudioEmitter>,
    vibration: VibrationEmitter,
}

impl ReminderDispatcher {
    pub fn new(providers: Providers) -> Self {
        let Providers {
            store,
            platform,
            page,
            notifier,
            player,
            vibrator,
            toaster,
            clock,
        } = providers;

        let audio = Arc::new(AudioEmitter::new(player, Arc::clone(&store)));
        let title_flash = TitleFlasher::new(Arc::clone(&page), Arc::clone(&platform), Arc::clone(&store));
        let notifications = DesktopNotifier::new(
            notifier,
            Arc::clone(&platform),
            Arc::clone(&store),
            Arc::clone(&audio),
        );
        let vibration = VibrationEmitter::new(vibrator, Arc::clone(&platform), Arc::clone(&store));

        Self {
            store,
            platform,
            page,
            toaster,
            clock,
            gate: DebounceGate::new(),
            title_flash,
            notifications,
            audio,
            vibration,
        }
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    pub fn toaster(&self) -> &Arc<dyn Toaster> {
        &self.toaster
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn audio(&self) -> &Arc<AudioEmitter> {
        &self.audio
    }

    pub fn title_flash(&self) -> &TitleFlasher {
        &self.title_flash
    }

    pub fn notifications(&self) -> &DesktopNotifier {
        &self.notifications
    }

    pub fn detected_platform(&self) -> PlatformTag {
        self.platform.detected()
    }

    pub async fn effective_platform(&self) -> PlatformTag {
        let settings = self.store.snapshot().await;
        self.platform.effective(settings.platform_override)
    }

    pub async fn last_fired_at(&self) -> Option<u64> {
        self.gate.last_fired_at().await
    }

    /// Run the reminder decision for one incoming message
    pub async fn handle_message(&self, event: MessageEvent) -> DispatchReport {
        if self.page.has_attention() {
            tracing::debug!("Message {}: page has attention, no reminder", event.id);
            return DispatchReport::new(DispatchOutcome::AttentionPresent);
        }

        let settings = self.store.snapshot().await;
        let is_mobile = self.platform.effective(settings.platform_override).is_mobile();

        let mut title_flash = None;
        if !is_mobile && settings.enable_reminder {
            title_flash = Some(self.title_flash.start().await);
        }

        let window = settings.notification_debounce_seconds;
        if !self.gate.try_fire(event.received_at_ms, window).await {
            tracing::debug!(
                "Message {}: loud reminders skipped (within {}s window)",
                event.id,
                window
            );
            let mut report = DispatchReport::new(DispatchOutcome::Debounced);
            report.title_flash = title_flash;
            return report;
        }

        tracing::info!("Message {}: firing reminder", event.id);
        let mut report = DispatchReport::new(DispatchOutcome::Fired);
        report.title_flash = title_flash;

        if settings.enable_notification {
            report.notification = self
                .notifications
                .send(
                    DEFAULT_NOTIFICATION_TITLE,
                    DEFAULT_NOTIFICATION_BODY,
                    NotificationOverrides::default(),
                )
                .await;
        }

        if is_mobile && settings.enable_vibration {
            report.vibrated = self.vibration.trigger(&VibrationPattern::default()).await;
        }

        report
    }

    /// User-initiated test of permission and sound wiring
    pub async fn run_permission_test(&self) -> PermissionTestOutcome {
        if !self.notifications.check_support() {
            self.toaster.error("This browser does not support notifications.");
            return PermissionTestOutcome::Unsupported;
        }

        match self.notifications.check_permission() {
            NotificationPermission::Denied => {
                self.toaster
                    .error("Notification permission was denied. Change it in the browser settings.");
                self.set_notifications_enabled(false).await;
                PermissionTestOutcome::Denied
            }
            NotificationPermission::Granted => {
                self.toaster.info("Notification permission already granted.");
                self.send_test_notification().await
            }
            NotificationPermission::Default => {
                self.toaster.info("Requesting notification permission...");
                if self.notifications.request_permission().await {
                    self.toaster.success("Notification permission granted!");
                    self.send_test_notification().await
                } else {
                    self.toaster
                        .warning("Permission not granted, notifications will not work.");
                    self.set_notifications_enabled(false).await;
                    PermissionTestOutcome::NotGranted
                }
            }
        }
    }

    async fn send_test_notification(&self) -> PermissionTestOutcome {
        self.set_notifications_enabled(true).await;

        let settings = self.store.snapshot().await;
        let window = settings.notification_debounce_seconds;
        if !self.gate.try_fire(self.clock.now_ms(), window).await {
            tracing::info!("Test notification skipped (within {}s window)", window);
            self.toaster.info(&format!(
                "Test notification skipped (within the {} second interval)",
                window
            ));
            return PermissionTestOutcome::Debounced;
        }

        let sent = self
            .notifications
            .send(
                TEST_NOTIFICATION_TITLE,
                TEST_NOTIFICATION_BODY,
                NotificationOverrides::with_tag(TEST_NOTIFICATION_TAG),
            )
            .await;

        match sent {
            Some(notification) => PermissionTestOutcome::Sent(notification),
            None => {
                self.toaster
                    .error("Failed to send the test notification or play its sound.");
                PermissionTestOutcome::SendFailed
            }
        }
    }

    /// Persist the notification switch if it differs
    async fn set_notifications_enabled(&self, enabled: bool) {
        if self.store.snapshot().await.enable_notification == enabled {
            return;
        }
        if let Err(e) = self
            .store
            .apply(SettingChange::NotificationEnabled(enabled))
            .await
        {
            tracing::error!("Failed to save notification switch: {}", e);
        }
    }
}
