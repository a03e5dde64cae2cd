//! Reminder configuration constants
//!
//! Central location for the fixed strings, timings and resource limits
//! used by the reminder channels.

// ===== Identity =====

/// Settings namespace; also the prefix used for the settings file name
pub const SETTINGS_NAMESPACE: &str = "chat-reminder";

// ===== Title Flash =====

/// Title shown while a tab is flagged for unread messages
pub const ALERT_TITLE: &str = "[New message]";

/// Title restored when the original title was lost mid-flash
pub const FALLBACK_TITLE: &str = "Chat";

/// Interval between title swaps in milliseconds
pub const FLASH_INTERVAL_MS: u64 = 1_000;

// ===== Desktop Notifications =====

/// Tag shared by message notifications so successive ones collapse
pub const NOTIFICATION_TAG: &str = "chat-reminder-message";

/// Tag used by the manual permission test notification
pub const TEST_NOTIFICATION_TAG: &str = "chat-reminder-permission-test";

/// Icon shown on every desktop notification
pub const NOTIFICATION_ICON: &str = "/favicon.ico";

pub const DEFAULT_NOTIFICATION_TITLE: &str = "New message";
pub const DEFAULT_NOTIFICATION_BODY: &str = "You have a new message";

pub const TEST_NOTIFICATION_TITLE: &str = "Permission test";
pub const TEST_NOTIFICATION_BODY: &str = "Notifications are working!";

// ===== Audio =====

/// Built-in notification cue (relative to the host's public directory)
pub const DEFAULT_NOTIFICATION_SOUND_PATH: &str = "/sounds/notification.mp3";

/// Built-in error cue (relative to the host's public directory)
pub const DEFAULT_ERROR_SOUND_PATH: &str = "/sounds/error.mp3";

/// Shared playback volume in the range 0.0..=1.0
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Largest accepted user sound file (5 MiB).
/// Payloads are stored inline in the settings file.
pub const MAX_SOUND_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Accepted MIME type prefix for user sound files
pub const AUDIO_MIME_PREFIX: &str = "audio/";

// ===== Vibration =====

/// Default vibration pulse in milliseconds
pub const DEFAULT_VIBRATION_MS: u32 = 200;

// ===== Settings =====

/// Default spacing between loud reminders in seconds
pub const DEFAULT_DEBOUNCE_SECONDS: u32 = 5;

/// Delay before a settings change is written to disk.
/// A newer change within this window replaces the pending write.
pub const SETTINGS_SAVE_DEBOUNCE_MS: u64 = 1_000;

/// How long the startup failure toast stays visible
pub const INIT_ERROR_TOAST_TIMEOUT_MS: u64 = 10_000;
