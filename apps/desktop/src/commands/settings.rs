//! Settings commands.

use super::CommandError;
use crate::state::AppState;
use drill_core::Settings;

pub fn get_settings(state: &AppState) -> Result<Settings, CommandError> {
    let rt = state.runtime.lock()?;
    Ok(rt.settings.snapshot())
}

/// Replace all settings. The running session keeps its snapshot.
pub fn save_settings(state: &AppState, settings: Settings) -> Result<Settings, CommandError> {
    let mut guard = state.runtime.lock()?;
    let rt = &mut *guard;
    let saved = rt.settings.replace(&mut rt.repository, settings)?;
    Ok(saved.clone())
}

/// Merge a partial settings object over the current settings.
pub fn update_settings(
    state: &AppState,
    patch: serde_json::Value,
) -> Result<Settings, CommandError> {
    let mut guard = state.runtime.lock()?;
    let rt = &mut *guard;
    let next = rt.settings.current().merged(patch)?;
    let saved = rt.settings.replace(&mut rt.repository, next)?;
    Ok(saved.clone())
}
