//! Tauri backend for system notifications
//!
//! Shows notifications through `tauri-plugin-notification`. The plugin has
//! no tag concept, so a tag is mapped to a stable notification id and a
//! repeated tag replaces the earlier notification.

use crate::error::{ReminderError, Result};
use crate::services::notifications::{NotificationOptions, NotificationPermission, SystemNotifier};
use ::tauri::plugin::PermissionState;
use ::tauri::{AppHandle, Runtime};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicI32, Ordering};
use tauri_plugin_notification::NotificationExt;

pub struct TauriNotifier<R: Runtime> {
    app: AppHandle<R>,
    next_id: AtomicI32,
}

impl<R: Runtime> TauriNotifier<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self {
            app,
            next_id: AtomicI32::new(1),
        }
    }
}

fn map_permission(state: PermissionState) -> NotificationPermission {
    match state {
        PermissionState::Granted => NotificationPermission::Granted,
        PermissionState::Denied => NotificationPermission::Denied,
        _ => NotificationPermission::Default,
    }
}

/// Stable positive id for a tag
fn tag_id(tag: &str) -> i32 {
    let digest = Sha256::digest(tag.as_bytes());
    i32::from_be_bytes([digest[0] & 0x7f, digest[1], digest[2], digest[3]])
}

#[async_trait]
impl<R: Runtime> SystemNotifier for TauriNotifier<R> {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> NotificationPermission {
        match self.app.notification().permission_state() {
            Ok(state) => map_permission(state),
            Err(e) => {
                tracing::warn!("Failed to read notification permission: {}", e);
                NotificationPermission::Default
            }
        }
    }

    async fn request_permission(&self) -> Result<NotificationPermission> {
        self.app
            .notification()
            .request_permission()
            .map(map_permission)
            .map_err(|e| ReminderError::Notification(format!("Permission request failed: {}", e)))
    }

    fn show(&self, title: &str, options: &NotificationOptions) -> Result<()> {
        let id = match options.tag.as_deref() {
            Some(tag) => tag_id(tag),
            None => self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let mut builder = self
            .app
            .notification()
            .builder()
            .id(id)
            .title(title)
            .body(options.body.clone())
            .icon(options.icon.clone());
        if options.silent {
            builder = builder.silent();
        }

        builder
            .show()
            .map_err(|e| ReminderError::Notification(format!("Failed to show notification: {}", e)))
    }
}
