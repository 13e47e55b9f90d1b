use tauri::State;

use crate::{
    config::ApiConfig,
    gateway::StatusReport,
    ui::{SaveOutcome, SettingsSnapshot},
    AppState,
};

#[tauri::command]
pub fn get_settings_surface(state: State<AppState>) -> SettingsSnapshot {
    state.settings.snapshot()
}

#[tauri::command]
pub async fn open_settings(state: State<'_, AppState>) -> Result<SettingsSnapshot, String> {
    Ok(state.settings.open().await)
}

#[tauri::command]
pub fn edit_settings(config: ApiConfig, state: State<AppState>) -> SettingsSnapshot {
    state.settings.edit(config)
}

#[tauri::command]
pub async fn test_settings(state: State<'_, AppState>) -> Result<Option<StatusReport>, String> {
    Ok(state.settings.test().await)
}

#[tauri::command]
pub async fn save_settings(state: State<'_, AppState>) -> Result<SaveOutcome, String> {
    Ok(state.settings.save().await)
}

#[tauri::command]
pub fn close_settings(state: State<AppState>) {
    state.settings.close();
}
