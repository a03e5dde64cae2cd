//! Services module
//!
//! The reminder channels, their shared debounce gate and settings, and the
//! dispatcher that coordinates them.

pub mod audio;
pub mod debounce;
pub mod dispatcher;
pub mod error_handler;
pub mod notifications;
pub mod settings;
pub mod title_flash;
pub mod toast;
pub mod vibration;

pub use audio::{AudioEmitter, SoundPlayer, SoundSlot, SoundSource, SoundUpload};
pub use debounce::DebounceGate;
pub use dispatcher::{
    DispatchOutcome, DispatchReport, MessageEvent, PermissionTestOutcome, Providers,
    ReminderDispatcher,
};
pub use error_handler::{ErrorNotifier, FaultKind};
pub use notifications::{
    DesktopNotifier, Notification, NotificationOptions, NotificationOverrides,
    NotificationPermission, SystemNotifier,
};
pub use settings::{
    ConfigStore, CustomSound, JsonSettingsStore, MemorySettingsStore, MobileNotifyBehavior,
    ReminderSettings, SettingChange,
};
pub use title_flash::{FlashOutcome, PageSurface, TitleFlasher};
pub use toast::{LogToaster, ToastLevel, Toaster};
pub use vibration::{VibrationEmitter, VibrationPattern, Vibrator};
