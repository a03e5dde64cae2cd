//! Tab title flashing (desktop only)
//!
//! While the page lacks attention, the title alternates between an alert
//! string and the saved original title. Attention returning (page visible
//! again or window focused) stops the flash and restores the title.

use crate::config::{ALERT_TITLE, FALLBACK_TITLE, FLASH_INTERVAL_MS};
use crate::platform::PlatformClassifier;
use crate::services::settings::ConfigStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// The host page: its title plus visibility and focus signals
pub trait PageSurface: Send + Sync {
    fn title(&self) -> String;

    fn set_title(&self, title: &str);

    fn is_hidden(&self) -> bool;

    fn has_focus(&self) -> bool;

    /// The user is looking at the page
    fn has_attention(&self) -> bool {
        !self.is_hidden() && self.has_focus()
    }
}

/// Result of a flash request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOutcome {
    Started,
    AlreadyFlashing,
    /// Mobile platform, switch off, or the page has attention
    Skipped,
    /// A flash left over from before a switch to mobile was stopped
    StoppedStale,
}

#[derive(Default)]
struct FlashSession {
    saved_title: Option<String>,
    ticker: Option<JoinHandle<()>>,
    /// Bumped on every stop; a ticker from an older flash must not write
    generation: u64,
}

impl FlashSession {
    fn is_flashing(&self) -> bool {
        self.ticker.is_some()
    }
}

pub struct TitleFlasher {
    page: Arc<dyn PageSurface>,
    platform: Arc<dyn PlatformClassifier>,
    store: Arc<dyn ConfigStore>,
    interval: Duration,
    session: Arc<Mutex<FlashSession>>,
}

impl TitleFlasher {
    pub fn new(
        page: Arc<dyn PageSurface>,
        platform: Arc<dyn PlatformClassifier>,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            page,
            platform,
            store,
            interval: Duration::from_millis(FLASH_INTERVAL_MS),
            session: Arc::new(Mutex::new(FlashSession::default())),
        }
    }

    /// Override the toggle period
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn is_flashing(&self) -> bool {
        self.session.lock().await.is_flashing()
    }

    pub async fn start(&self) -> FlashOutcome {
        let settings = self.store.snapshot().await;
        let is_mobile = self.platform.effective(settings.platform_override).is_mobile();
        let mut session = self.session.lock().await;

        if is_mobile {
            if session.is_flashing() {
                Self::stop_session(&*self.page, &mut session);
                return FlashOutcome::StoppedStale;
            }
            return FlashOutcome::Skipped;
        }
        if session.is_flashing() {
            return FlashOutcome::AlreadyFlashing;
        }
        if !settings.enable_reminder || self.page.has_attention() {
            return FlashOutcome::Skipped;
        }

        let saved = session
            .saved_title
            .get_or_insert_with(|| {
                let title = self.page.title();
                if title.is_empty() {
                    FALLBACK_TITLE.to_string()
                } else {
                    title
                }
            })
            .clone();

        self.page.set_title(ALERT_TITLE);
        session.ticker = Some(spawn_ticker(
            Arc::clone(&self.page),
            Arc::clone(&self.session),
            session.generation,
            saved,
            self.interval,
        ));

        tracing::info!("Title flash started");
        FlashOutcome::Started
    }

    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        Self::stop_session(&*self.page, &mut session);
    }

    /// Host signal: page visibility changed
    pub async fn on_visibility_change(&self) {
        if !self.page.is_hidden() && self.is_flashing().await {
            self.stop().await;
        }
    }

    /// Host signal: window gained focus
    pub async fn on_focus(&self) {
        if self.is_flashing().await {
            self.stop().await;
        }
    }

    fn stop_session(page: &dyn PageSurface, session: &mut FlashSession) {
        let Some(ticker) = session.ticker.take() else {
            session.saved_title = None;
            return;
        };
        session.generation = session.generation.wrapping_add(1);
        ticker.abort();

        match session.saved_title.take() {
            Some(title) => page.set_title(&title),
            None => {
                tracing::warn!("Original title lost, restoring fallback title");
                page.set_title(FALLBACK_TITLE);
            }
        }
        tracing::info!("Title flash stopped");
    }
}

/// Toggle the title every `period`.
///
/// Each toggle runs under the session lock, so a stop either waits for a
/// toggle in progress or makes the next one bail out.
fn spawn_ticker(
    page: Arc<dyn PageSurface>,
    session: Arc<Mutex<FlashSession>>,
    generation: u64,
    saved: String,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let state = session.lock().await;
            if state.generation != generation {
                break;
            }
            if page.title() == ALERT_TITLE {
                page.set_title(&saved);
            } else {
                page.set_title(ALERT_TITLE);
            }
        }
    })
}
