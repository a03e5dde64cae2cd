//! Host backends for the capability traits

pub mod tauri;

pub use self::tauri::TauriNotifier;
