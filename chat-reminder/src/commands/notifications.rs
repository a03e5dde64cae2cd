//! Notification-related commands
//!
//! The desktop notification switch and the manual permission test.

use crate::app::AppState;
use crate::error::Result;
use crate::services::{NotificationPermission, PermissionTestOutcome, SettingChange};

/// Flip the desktop notification switch.
///
/// Turning it on resolves the permission first: a denied permission keeps
/// the switch off, an unrequested one prompts the user. Returns the final
/// switch state.
pub async fn set_notifications_enabled(state: &AppState, enabled: bool) -> Result<bool> {
    let dispatcher = &state.dispatcher;
    let toaster = dispatcher.toaster();
    let store = dispatcher.store();

    if enabled {
        match dispatcher.notifications().check_permission() {
            NotificationPermission::Denied => {
                toaster.error(
                    "Notification permission was denied by the browser. Enable it in the browser settings.",
                );
                store.apply(SettingChange::NotificationEnabled(false)).await?;
                return Ok(false);
            }
            NotificationPermission::Default => {
                toaster.info("Requesting notification permission...");
                if !dispatcher.notifications().request_permission().await {
                    toaster.warning("Notification permission not granted.");
                    store.apply(SettingChange::NotificationEnabled(false)).await?;
                    return Ok(false);
                }
                toaster.success("Notification permission granted!");
            }
            NotificationPermission::Granted => {}
        }
    }

    store.apply(SettingChange::NotificationEnabled(enabled)).await?;
    Ok(enabled)
}

/// Check permission and send a test notification with its sound
pub async fn test_notification_permission(state: &AppState) -> PermissionTestOutcome {
    tracing::info!("Manual notification test requested");
    state.dispatcher.run_permission_test().await
}
