//! Device vibration (mobile only)

use crate::config::DEFAULT_VIBRATION_MS;
use crate::error::Result;
use crate::platform::PlatformClassifier;
use crate::services::settings::ConfigStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single pulse or an on/off sequence in milliseconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VibrationPattern {
    Pulse(u32),
    Sequence(Vec<u32>),
}

impl Default for VibrationPattern {
    fn default() -> Self {
        VibrationPattern::Pulse(DEFAULT_VIBRATION_MS)
    }
}

pub trait Vibrator: Send + Sync {
    fn is_supported(&self) -> bool;

    fn vibrate(&self, pattern: &VibrationPattern) -> Result<()>;
}

pub struct VibrationEmitter {
    vibrator: Arc<dyn Vibrator>,
    platform: Arc<dyn PlatformClassifier>,
    store: Arc<dyn ConfigStore>,
    unsupported_logged: AtomicBool,
}

impl VibrationEmitter {
    pub fn new(
        vibrator: Arc<dyn Vibrator>,
        platform: Arc<dyn PlatformClassifier>,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            vibrator,
            platform,
            store,
            unsupported_logged: AtomicBool::new(false),
        }
    }

    fn check_support(&self) -> bool {
        let supported = self.vibrator.is_supported();
        if !supported && !self.unsupported_logged.swap(true, Ordering::Relaxed) {
            tracing::warn!("Vibration is not supported on this device");
        }
        supported
    }

    /// Vibrate if enabled, on a mobile platform, and supported.
    /// Returns whether the device was asked to vibrate.
    pub async fn trigger(&self, pattern: &VibrationPattern) -> bool {
        let settings = self.store.snapshot().await;
        if !settings.enable_vibration
            || !self.platform.effective(settings.platform_override).is_mobile()
            || !self.check_support()
        {
            return false;
        }

        match self.vibrator.vibrate(pattern) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Vibration failed: {}", e);
                false
            }
        }
    }
}
