//! Integration tests for the chat reminder engine
//!
//! These tests verify end-to-end functionality including:
//! - Message dispatch across title flash, notification, sound and vibration
//! - The shared debounce window
//! - Settings panel commands and the manual permission test
//! - The host event loop and startup

use chat_reminder::app::{self, AppState, HostEvent};
use chat_reminder::clock::ManualClock;
use chat_reminder::commands;
use chat_reminder::config::{
    ALERT_TITLE, NOTIFICATION_TAG, SETTINGS_NAMESPACE, TEST_NOTIFICATION_TAG,
};
use chat_reminder::mock::{MockNotifier, MockPage, MockSoundPlayer, MockToaster, MockVibrator};
use chat_reminder::platform::{PlatformOverride, PlatformTag, UserAgentClassifier};
use chat_reminder::services::{
    ConfigStore, DispatchOutcome, FlashOutcome, MemorySettingsStore, MessageEvent,
    MobileNotifyBehavior, NotificationPermission, PermissionTestOutcome, ReminderSettings,
    SoundSlot, SoundUpload, ToastLevel,
};
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    state: AppState,
    store: Arc<MemorySettingsStore>,
    page: Arc<MockPage>,
    notifier: Arc<MockNotifier>,
    player: Arc<MockSoundPlayer>,
    vibrator: Arc<MockVibrator>,
    toaster: Arc<MockToaster>,
    clock: Arc<ManualClock>,
}

/// Helper to build an initialized engine around mock providers
async fn create_harness(platform: PlatformTag, settings: ReminderSettings) -> Harness {
    let store = Arc::new(MemorySettingsStore::new(settings));
    let page = Arc::new(MockPage::new("Team chat"));
    let notifier = Arc::new(MockNotifier::new(NotificationPermission::Granted));
    let player = Arc::new(MockSoundPlayer::new());
    let vibrator = Arc::new(MockVibrator::new());
    let toaster = Arc::new(MockToaster::new());
    let clock = Arc::new(ManualClock::new(0));

    let providers = chat_reminder::services::Providers {
        store: store.clone(),
        platform: Arc::new(UserAgentClassifier::with_detected(platform)),
        page: page.clone(),
        notifier: notifier.clone(),
        player: player.clone(),
        vibrator: vibrator.clone(),
        toaster: toaster.clone(),
        clock: clock.clone(),
    };
    let state = app::setup(providers).await;

    Harness {
        state,
        store,
        page,
        notifier,
        player,
        vibrator,
        toaster,
        clock,
    }
}

async fn send_message(harness: &Harness, at_ms: u64) -> chat_reminder::services::DispatchReport {
    harness.state.dispatcher.handle_message(MessageEvent::new(at_ms)).await
}

#[tokio::test]
async fn test_no_reminder_while_page_has_attention() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;

    let report = send_message(&harness, 0).await;

    assert_eq!(report.outcome, DispatchOutcome::AttentionPresent);
    assert!(harness.notifier.shown().is_empty());
    assert!(harness.player.plays().is_empty());
    assert_eq!(harness.page_title(), "Team chat");
    assert_eq!(harness.state.dispatcher.last_fired_at().await, None);
}

#[tokio::test]
async fn test_debounce_window_limits_loud_reminders() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.page.background();

    let first = send_message(&harness, 0).await;
    let second = send_message(&harness, 2_000).await;
    let third = send_message(&harness, 6_000).await;

    assert_eq!(first.outcome, DispatchOutcome::Fired);
    assert_eq!(second.outcome, DispatchOutcome::Debounced);
    assert_eq!(third.outcome, DispatchOutcome::Fired);

    assert_eq!(harness.notifier.shown().len(), 2);
    assert_eq!(
        harness.player.plays(),
        vec![SoundSlot::Notification, SoundSlot::Notification]
    );
    assert_eq!(harness.state.dispatcher.last_fired_at().await, Some(6_000));
}

#[tokio::test]
async fn test_title_flash_ignores_debounce() {
    let settings = ReminderSettings {
        notification_debounce_seconds: 10,
        ..ReminderSettings::default()
    };
    let harness = create_harness(PlatformTag::Pc, settings).await;
    harness.page.background();

    let first = send_message(&harness, 0).await;
    let second = send_message(&harness, 1_000).await;

    assert_eq!(first.title_flash, Some(FlashOutcome::Started));
    assert_eq!(second.title_flash, Some(FlashOutcome::AlreadyFlashing));
    assert_eq!(second.outcome, DispatchOutcome::Debounced);
    assert_eq!(harness.page_title(), ALERT_TITLE);

    assert_eq!(harness.notifier.shown().len(), 1);
    assert_eq!(harness.player.plays().len(), 1);
}

#[tokio::test]
async fn test_focus_restores_title() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.page.background();
    send_message(&harness, 0).await;

    harness.page.foreground();
    harness.state.handle_event(HostEvent::FocusGained).await;

    assert!(!harness.state.dispatcher.title_flash().is_flashing().await);
    assert_eq!(harness.page_title(), "Team chat");
}

#[tokio::test]
async fn test_mobile_vibrates_without_title_flash() {
    let harness = create_harness(PlatformTag::Android, ReminderSettings::default()).await;
    harness.page.background();

    let report = send_message(&harness, 0).await;

    assert_eq!(report.outcome, DispatchOutcome::Fired);
    assert_eq!(report.title_flash, None);
    assert!(report.vibrated);
    assert_eq!(harness.vibrator.patterns().len(), 1);
    assert_eq!(harness.page_title(), "Team chat");
}

#[tokio::test]
async fn test_pc_never_vibrates() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.page.background();

    let report = send_message(&harness, 0).await;

    assert!(!report.vibrated);
    assert!(harness.vibrator.patterns().is_empty());
}

#[tokio::test]
async fn test_android_replace_reuses_tag() {
    let harness = create_harness(PlatformTag::Android, ReminderSettings::default()).await;
    harness.page.background();

    send_message(&harness, 0).await;
    send_message(&harness, 6_000).await;

    let shown = harness.notifier.shown();
    assert_eq!(shown.len(), 2);
    for notification in &shown {
        assert_eq!(notification.options.tag.as_deref(), Some(NOTIFICATION_TAG));
        assert_eq!(notification.options.renotify, Some(false));
        assert!(notification.options.silent);
    }
}

#[tokio::test]
async fn test_android_stack_leaves_tag_unset() {
    let settings = ReminderSettings {
        mobile_notification_behavior: MobileNotifyBehavior::Stack,
        ..ReminderSettings::default()
    };
    let harness = create_harness(PlatformTag::Android, settings).await;
    harness.page.background();

    send_message(&harness, 0).await;

    let shown = harness.notifier.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].options.tag, None);
}

#[tokio::test]
async fn test_platform_override_switches_to_mobile() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.page.background();

    let effective = commands::set_platform_override(&harness.state, PlatformOverride::Ios)
        .await
        .unwrap();
    assert_eq!(effective, PlatformTag::Ios);

    let report = send_message(&harness, 0).await;
    assert_eq!(report.title_flash, None);
    assert!(report.vibrated);
}

#[tokio::test]
async fn test_unsupported_notifications_skip_channel() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.notifier.set_supported(false);
    harness.page.background();

    let report = send_message(&harness, 0).await;

    assert_eq!(report.outcome, DispatchOutcome::Fired);
    assert_eq!(report.notification, None);
    assert!(harness.player.plays().is_empty());
}

// ===== Manual permission test =====

#[tokio::test]
async fn test_permission_test_denied_forces_switch_off() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.notifier.set_permission(NotificationPermission::Denied);

    let outcome = commands::test_notification_permission(&harness.state).await;

    assert_eq!(outcome, PermissionTestOutcome::Denied);
    assert!(!harness.store.snapshot().await.enable_notification);
    assert_eq!(harness.toaster.count(ToastLevel::Error), 1);
    assert!(harness.notifier.shown().is_empty());
}

#[tokio::test]
async fn test_permission_test_prompts_then_sends() {
    let settings = ReminderSettings {
        enable_notification: false,
        ..ReminderSettings::default()
    };
    let harness = create_harness(PlatformTag::Pc, settings).await;
    harness.notifier.set_permission(NotificationPermission::Default);
    harness.notifier.answer_requests_with(NotificationPermission::Granted);
    harness.clock.set(50_000);

    let outcome = commands::test_notification_permission(&harness.state).await;

    let PermissionTestOutcome::Sent(notification) = outcome else {
        panic!("expected a sent test notification, got {:?}", outcome);
    };
    assert_eq!(notification.title, "Permission test");
    assert_eq!(notification.options.body, "Notifications are working!");
    assert_eq!(notification.options.tag.as_deref(), Some(TEST_NOTIFICATION_TAG));
    assert_eq!(harness.notifier.permission_requests(), 1);
    assert!(harness.store.snapshot().await.enable_notification);
    assert_eq!(harness.player.plays(), vec![SoundSlot::Notification]);
    assert_eq!(harness.toaster.count(ToastLevel::Success), 1);
}

#[tokio::test]
async fn test_permission_test_refused_prompt() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.notifier.set_permission(NotificationPermission::Default);
    harness.notifier.answer_requests_with(NotificationPermission::Denied);

    let outcome = commands::test_notification_permission(&harness.state).await;

    assert_eq!(outcome, PermissionTestOutcome::NotGranted);
    assert!(!harness.store.snapshot().await.enable_notification);
    assert_eq!(harness.toaster.count(ToastLevel::Warning), 1);
}

#[tokio::test]
async fn test_permission_test_shares_debounce_window() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.page.background();
    send_message(&harness, 10_000).await;

    harness.clock.set(12_000);
    let outcome = commands::test_notification_permission(&harness.state).await;

    assert_eq!(outcome, PermissionTestOutcome::Debounced);
    assert_eq!(harness.notifier.shown().len(), 1);
    let (level, message) = harness.toaster.messages().pop().unwrap();
    assert_eq!(level, ToastLevel::Info);
    assert!(message.contains('5'));
}

#[tokio::test]
async fn test_permission_test_unsupported() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    harness.notifier.set_supported(false);

    let outcome = commands::test_notification_permission(&harness.state).await;

    assert_eq!(outcome, PermissionTestOutcome::Unsupported);
    assert_eq!(harness.toaster.count(ToastLevel::Error), 1);
}

// ===== Notification switch =====

#[tokio::test]
async fn test_enable_notifications_when_denied() {
    let settings = ReminderSettings {
        enable_notification: false,
        ..ReminderSettings::default()
    };
    let harness = create_harness(PlatformTag::Pc, settings).await;
    harness.notifier.set_permission(NotificationPermission::Denied);

    let enabled = commands::set_notifications_enabled(&harness.state, true)
        .await
        .unwrap();

    assert!(!enabled);
    assert!(!harness.store.snapshot().await.enable_notification);
    assert_eq!(harness.toaster.count(ToastLevel::Error), 1);
    assert_eq!(harness.notifier.permission_requests(), 0);
}

#[tokio::test]
async fn test_enable_notifications_requests_permission() {
    let settings = ReminderSettings {
        enable_notification: false,
        ..ReminderSettings::default()
    };
    let harness = create_harness(PlatformTag::Pc, settings).await;
    harness.notifier.set_permission(NotificationPermission::Default);
    harness.notifier.answer_requests_with(NotificationPermission::Granted);

    let enabled = commands::set_notifications_enabled(&harness.state, true)
        .await
        .unwrap();

    assert!(enabled);
    assert!(harness.store.snapshot().await.enable_notification);
    assert_eq!(harness.notifier.permission_requests(), 1);
    assert_eq!(harness.toaster.count(ToastLevel::Success), 1);
}

#[tokio::test]
async fn test_disable_notifications() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;

    let enabled = commands::set_notifications_enabled(&harness.state, false)
        .await
        .unwrap();

    assert!(!enabled);
    assert!(!harness.store.snapshot().await.enable_notification);
    assert!(harness.toaster.messages().is_empty());
}

// ===== Sounds and settings =====

#[tokio::test]
async fn test_oversized_sound_keeps_previous_source() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    let before = harness.player.source_location(SoundSlot::Notification);

    let upload = SoundUpload {
        filename: "huge.mp3".to_string(),
        mime_type: "audio/mpeg".to_string(),
        bytes: vec![0; 6 * 1024 * 1024],
    };
    let result = commands::select_sound_file(&harness.state, SoundSlot::Notification, upload).await;

    assert!(result.is_err());
    assert_eq!(harness.player.source_location(SoundSlot::Notification), before);
    assert_eq!(harness.store.snapshot().await.notification_sound, None);
    assert_eq!(harness.toaster.count(ToastLevel::Error), 1);
}

#[tokio::test]
async fn test_select_and_clear_sound() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;

    let upload = SoundUpload {
        filename: "ding.wav".to_string(),
        mime_type: "audio/wav".to_string(),
        bytes: b"RIFF".to_vec(),
    };
    commands::select_sound_file(&harness.state, SoundSlot::Error, upload)
        .await
        .unwrap();

    let location = harness.player.source_location(SoundSlot::Error).unwrap();
    assert_eq!(location, "data:audio/wav;base64,UklGRg==");
    let status = commands::get_status(&harness.state).await;
    assert_eq!(status.error_sound_name, "ding.wav");
    assert_eq!(status.notification_sound_name, "Default");

    commands::clear_sound_file(&harness.state, SoundSlot::Error)
        .await
        .unwrap();
    assert_eq!(
        harness.player.source_location(SoundSlot::Error).as_deref(),
        Some("/sounds/error.mp3")
    );
    assert_eq!(harness.store.snapshot().await.error_sound, None);
}

#[tokio::test]
async fn test_debounce_input_parsing() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;

    assert_eq!(commands::set_debounce_seconds(&harness.state, "12").await.unwrap(), 12);
    assert_eq!(commands::set_debounce_seconds(&harness.state, "abc").await.unwrap(), 0);
    assert_eq!(harness.store.snapshot().await.notification_debounce_seconds, 0);
}

#[tokio::test]
async fn test_zero_debounce_fires_every_message() {
    let settings = ReminderSettings {
        notification_debounce_seconds: 0,
        ..ReminderSettings::default()
    };
    let harness = create_harness(PlatformTag::Pc, settings).await;
    harness.page.background();

    send_message(&harness, 0).await;
    send_message(&harness, 1).await;

    assert_eq!(harness.notifier.shown().len(), 2);
}

#[tokio::test]
async fn test_status_reports_detected_platform() {
    let harness = create_harness(PlatformTag::Android, ReminderSettings::default()).await;

    let status = commands::get_status(&harness.state).await;
    assert_eq!(status.detected_label.as_deref(), Some("(Detected: Android)"));
    assert!(status.is_mobile);
    assert!(status.controls.reminder_toggle_disabled);

    commands::set_platform_override(&harness.state, PlatformOverride::Pc)
        .await
        .unwrap();
    let status = commands::get_status(&harness.state).await;
    assert_eq!(status.detected_label, None);
    assert_eq!(status.effective_platform, PlatformTag::Pc);
}

// ===== Event loop and startup =====

#[tokio::test]
async fn test_event_loop_plays_error_sound() {
    let harness = create_harness(PlatformTag::Pc, ReminderSettings::default()).await;
    let (events, receiver) = app::event_channel();
    let runner = tokio::spawn(harness.state.clone().run(receiver));

    events
        .send(HostEvent::UncaughtError(anyhow::anyhow!("boom")))
        .unwrap();
    events
        .send(HostEvent::UnhandledRejection(anyhow::anyhow!("rejected")))
        .unwrap();
    drop(events);
    runner.await.unwrap();

    assert_eq!(harness.player.plays(), vec![SoundSlot::Error, SoundSlot::Error]);
    assert!(harness.toaster.messages().is_empty());
}

#[tokio::test]
async fn test_error_sound_switch_off() {
    let settings = ReminderSettings {
        enable_error_sound: false,
        ..ReminderSettings::default()
    };
    let harness = create_harness(PlatformTag::Pc, settings).await;

    harness
        .state
        .handle_event(HostEvent::UncaughtError(anyhow::anyhow!("boom")))
        .await;

    assert!(harness.player.plays().is_empty());
}

#[tokio::test]
async fn test_corrupt_settings_fail_startup_with_toast() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(format!("{}.json", SETTINGS_NAMESPACE)),
        "{not json",
    )
    .unwrap();
    let toaster = MockToaster::new();

    let result = app::open_settings(temp_dir.path(), &toaster).await;

    assert!(result.is_err());
    assert_eq!(toaster.count(ToastLevel::Error), 1);
}

#[tokio::test]
async fn test_open_settings_creates_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let toaster = MockToaster::new();

    let store = app::open_settings(temp_dir.path(), &toaster).await.unwrap();

    assert!(store.path().exists());
    assert_eq!(store.snapshot().await, ReminderSettings::default());
    assert!(toaster.messages().is_empty());
}

impl Harness {
    fn page_title(&self) -> String {
        use chat_reminder::services::PageSurface;
        self.page.title()
    }
}
