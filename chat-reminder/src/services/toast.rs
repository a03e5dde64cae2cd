//! User-visible soft messages
//!
//! The host renders these as toasts. Hosts without a toast surface can use
//! [`LogToaster`], which only logs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

pub trait Toaster: Send + Sync {
    fn show(&self, level: ToastLevel, message: &str);

    fn info(&self, message: &str) {
        self.show(ToastLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.show(ToastLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.show(ToastLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.show(ToastLevel::Error, message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogToaster;

impl Toaster for LogToaster {
    fn show(&self, level: ToastLevel, message: &str) {
        match level {
            ToastLevel::Info | ToastLevel::Success => tracing::info!("[toast] {}", message),
            ToastLevel::Warning => tracing::warn!("[toast] {}", message),
            ToastLevel::Error => tracing::error!("[toast] {}", message),
        }
    }
}
