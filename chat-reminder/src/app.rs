//! Application state and initialization
//!
//! This module wires the capability providers into the reminder engine and
//! runs the host event loop. Host events are handled one at a time, in the
//! order they arrive.

use crate::config::{INIT_ERROR_TOAST_TIMEOUT_MS, SETTINGS_NAMESPACE};
use crate::error::Result;
use crate::services::error_handler::install_panic_hook;
use crate::services::{
    DispatchReport, ErrorNotifier, FaultKind, JsonSettingsStore, MessageEvent, Providers,
    ReminderDispatcher, Toaster,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Everything the host page can report to the engine
#[derive(Debug)]
pub enum HostEvent {
    /// A chat message finished arriving
    MessageReceived(MessageEvent),
    VisibilityChanged,
    FocusGained,
    UncaughtError(anyhow::Error),
    UnhandledRejection(anyhow::Error),
}

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ReminderDispatcher>,
    pub errors: ErrorNotifier,
}

impl AppState {
    pub fn new(providers: Providers) -> Self {
        let dispatcher = Arc::new(ReminderDispatcher::new(providers));
        let errors = ErrorNotifier::new(Arc::clone(dispatcher.audio()));
        Self { dispatcher, errors }
    }

    /// Handle one host event. Returns the dispatch report for messages.
    pub async fn handle_event(&self, event: HostEvent) -> Option<DispatchReport> {
        match event {
            HostEvent::MessageReceived(message) => {
                Some(self.dispatcher.handle_message(message).await)
            }
            HostEvent::VisibilityChanged => {
                self.dispatcher.title_flash().on_visibility_change().await;
                None
            }
            HostEvent::FocusGained => {
                self.dispatcher.title_flash().on_focus().await;
                None
            }
            HostEvent::UncaughtError(error) => {
                self.errors.handle(FaultKind::UncaughtError, &error).await;
                None
            }
            HostEvent::UnhandledRejection(error) => {
                self.errors.handle(FaultKind::UnhandledRejection, &error).await;
                None
            }
        }
    }

    /// Process host events until every sender is dropped
    pub async fn run(self, mut events: UnboundedReceiver<HostEvent>) {
        tracing::info!("Reminder event loop started");
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        self.dispatcher.title_flash().stop().await;
        tracing::info!("Reminder event loop stopped");
    }
}

/// Channel carrying host events into [`AppState::run`]
pub fn event_channel() -> (UnboundedSender<HostEvent>, UnboundedReceiver<HostEvent>) {
    mpsc::unbounded_channel()
}

/// Report panics to the event loop as uncaught errors
pub fn install_error_hook(events: UnboundedSender<HostEvent>) {
    install_panic_hook(events, HostEvent::UncaughtError);
}

/// Open the settings file under `dir`.
///
/// A failure is shown to the user once and the engine does not start.
pub async fn open_settings(dir: &Path, toaster: &dyn Toaster) -> Result<JsonSettingsStore> {
    match JsonSettingsStore::load(dir, SETTINGS_NAMESPACE).await {
        Ok(store) => Ok(store),
        Err(e) => {
            tracing::error!("Failed to initialize settings: {}", e);
            toaster.error(&format!(
                "Chat reminder failed to initialize: {} (shown for {}s)",
                e,
                INIT_ERROR_TOAST_TIMEOUT_MS / 1000
            ));
            Err(e)
        }
    }
}

/// Application setup - called once on startup
pub async fn setup(providers: Providers) -> AppState {
    tracing::info!("Initializing chat reminder");

    let state = AppState::new(providers);
    let dispatcher = &state.dispatcher;

    dispatcher.audio().init().await;

    let detected = dispatcher.detected_platform();
    let effective = dispatcher.effective_platform().await;
    tracing::info!(
        "Platform detected: {}, effective: {}, notification permission: {:?}",
        detected,
        effective,
        dispatcher.notifications().check_permission()
    );

    tracing::info!("Chat reminder initialized successfully");
    state
}

/// Set up the engine, route panics into it, and start the event loop.
///
/// Returns the state for commands, the sender hosts report events on, and
/// the loop task.
pub async fn launch(providers: Providers) -> (AppState, UnboundedSender<HostEvent>, JoinHandle<()>) {
    let state = setup(providers).await;
    let (events, receiver) = event_channel();
    install_error_hook(events.clone());
    let runner = tokio::spawn(state.clone().run(receiver));
    (state, events, runner)
}
