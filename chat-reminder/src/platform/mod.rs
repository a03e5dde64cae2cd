//! Platform classification
//!
//! Decides whether the reminder channels should behave like a desktop
//! browser or a mobile one. Detection runs once; a user override from the
//! settings takes precedence afterwards.

pub mod detection;

pub use detection::*;
