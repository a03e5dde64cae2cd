//! Commands invoked from the host settings panel
//!
//! This module organizes commands into logical submodules:
//! - `notifications`: Desktop notification switch and permission test
//! - `sounds`: Custom sound selection
//! - `settings`: Remaining switches, values, and the panel status

pub mod notifications;
pub mod settings;
pub mod sounds;

// Re-export all commands for convenient use by hosts
pub use notifications::*;
pub use settings::*;
pub use sounds::*;
