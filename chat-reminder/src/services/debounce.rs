//! Debounce gate shared by the loud reminder channels
//!
//! Holds the single `last fired` timestamp. The timestamp is taken before
//! any emitter runs, so a failing emitter still uses up the window.

use tokio::sync::Mutex;

/// True when a reminder at `now_ms` falls inside the window opened by the
/// previous one. A window of 0 seconds disables the gate.
pub fn should_suppress(now_ms: u64, last_fired_at: Option<u64>, window_seconds: u32) -> bool {
    if window_seconds == 0 {
        return false;
    }
    match last_fired_at {
        Some(last) => now_ms.saturating_sub(last) < u64::from(window_seconds) * 1_000,
        None => false,
    }
}

#[derive(Debug, Default)]
pub struct DebounceGate {
    last_fired_at: Mutex<Option<u64>>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last_fired_at(&self) -> Option<u64> {
        *self.last_fired_at.lock().await
    }

    pub async fn should_suppress(&self, now_ms: u64, window_seconds: u32) -> bool {
        should_suppress(now_ms, *self.last_fired_at.lock().await, window_seconds)
    }

    /// Record a fired reminder. The stored value never moves backwards.
    pub async fn mark_fired(&self, now_ms: u64) {
        let mut last = self.last_fired_at.lock().await;
        *last = Some(last.map_or(now_ms, |previous| previous.max(now_ms)));
    }

    /// Check and mark under one lock. Returns false when suppressed.
    pub async fn try_fire(&self, now_ms: u64, window_seconds: u32) -> bool {
        let mut last = self.last_fired_at.lock().await;
        if should_suppress(now_ms, *last, window_seconds) {
            return false;
        }
        *last = Some(last.map_or(now_ms, |previous| previous.max(now_ms)));
        true
    }
}
