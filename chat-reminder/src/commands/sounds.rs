//! Sound file commands
//!
//! Selecting and clearing the user sound of a slot.

use crate::app::AppState;
use crate::error::Result;
use crate::services::{SettingChange, SoundSlot, SoundUpload};

fn slot_label(slot: SoundSlot) -> &'static str {
    match slot {
        SoundSlot::Notification => "Notification",
        SoundSlot::Error => "Error",
    }
}

/// Use an uploaded file as the sound of a slot.
///
/// Rejected files leave the current sound untouched and show an error.
pub async fn select_sound_file(state: &AppState, slot: SoundSlot, upload: SoundUpload) -> Result<()> {
    let dispatcher = &state.dispatcher;
    let toaster = dispatcher.toaster();

    let sound = match upload.into_custom_sound() {
        Ok(sound) => sound,
        Err(e) => {
            tracing::warn!("Rejected {} sound file: {}", slot, e);
            toaster.error(&e.to_string());
            return Err(e);
        }
    };

    dispatcher
        .store()
        .apply(SettingChange::Sound(slot, Some(sound.clone())))
        .await?;
    dispatcher.audio().set_source(slot, Some(&sound)).await;

    toaster.success(&format!(
        "{} sound \"{}\" set",
        slot_label(slot),
        sound.filename
    ));
    Ok(())
}

/// Go back to the built-in sound of a slot
pub async fn clear_sound_file(state: &AppState, slot: SoundSlot) -> Result<()> {
    let dispatcher = &state.dispatcher;

    dispatcher
        .store()
        .apply(SettingChange::Sound(slot, None))
        .await?;
    dispatcher.audio().set_source(slot, None).await;

    dispatcher
        .toaster()
        .info(&format!("{} sound reset to default", slot_label(slot)));
    Ok(())
}
