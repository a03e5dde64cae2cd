//! Global error notifier
//!
//! Uncaught errors and unhandled rejections from anywhere in the host page
//! are logged and answered with the error sound only. No popup is shown;
//! background errors are frequent enough that one would be noise.

use crate::services::audio::{AudioEmitter, SoundSlot};
use std::fmt;
use std::panic;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Where a host fault came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    UncaughtError,
    UnhandledRejection,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::UncaughtError => f.write_str("uncaught error"),
            FaultKind::UnhandledRejection => f.write_str("unhandled rejection"),
        }
    }
}

#[derive(Clone)]
pub struct ErrorNotifier {
    audio: Arc<AudioEmitter>,
}

impl ErrorNotifier {
    pub fn new(audio: Arc<AudioEmitter>) -> Self {
        Self { audio }
    }

    /// Log the fault and play the error cue. Returns whether a sound played.
    pub async fn handle(&self, kind: FaultKind, error: &anyhow::Error) -> bool {
        tracing::error!("Captured {}: {:#}", kind, error);
        self.audio.play(SoundSlot::Error).await
    }
}

/// Forward panics to the host event loop as uncaught errors.
///
/// The previously installed hook still runs first.
pub fn install_panic_hook<E>(events: UnboundedSender<E>, make_event: fn(anyhow::Error) -> E)
where
    E: Send + 'static,
{
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        previous(info);
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let location = info
            .location()
            .map(|l| format!(" at {}:{}", l.file(), l.line()))
            .unwrap_or_default();

        // Receiver gone means the loop has shut down
        let _ = events.send(make_event(anyhow::anyhow!("panic: {}{}", message, location)));
    }));
}
