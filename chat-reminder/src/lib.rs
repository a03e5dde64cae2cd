//! Chat reminder library
//!
//! Reminder engine for a chat page: title flash, desktop notifications with
//! a sound cue, mobile vibration, and an error sound for page faults. Hosts
//! supply the page, notification, audio and vibration capabilities.

pub mod app;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
#[cfg(feature = "tauri-host")]
pub mod host;
pub mod logging;
pub mod mock;
pub mod platform;
pub mod services;
