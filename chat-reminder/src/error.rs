//! Error types for the chat reminder engine
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the host settings panel.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Vibration error: {0}")]
    Vibration(String),

    #[error("Invalid sound file: {0}")]
    InvalidSound(String),

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for ReminderError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReminderError>;
