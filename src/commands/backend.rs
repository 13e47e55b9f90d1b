use std::path::PathBuf;

use tauri::State;

use crate::{config::ApiConfig, gateway::StatusReport, AppState};

#[tauri::command]
pub async fn get_api_config(state: State<'_, AppState>) -> Result<ApiConfig, String> {
    Ok(state.backend.get_config())
}

#[tauri::command]
pub async fn validate_api_config(
    config: ApiConfig,
    state: State<'_, AppState>,
) -> Result<StatusReport, String> {
    Ok(state.backend.validate_config(&config).await)
}

#[tauri::command]
pub async fn save_api_config(
    config: ApiConfig,
    state: State<'_, AppState>,
) -> Result<StatusReport, String> {
    state
        .backend
        .save_config(config)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn test_api_connection(
    config: ApiConfig,
    state: State<'_, AppState>,
) -> Result<StatusReport, String> {
    Ok(state.backend.test_connection(&config).await)
}

#[tauri::command]
pub async fn process_image(image_path: String, state: State<'_, AppState>) -> Result<String, String> {
    state
        .backend
        .process_image(PathBuf::from(image_path))
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_clipboard_image(state: State<'_, AppState>) -> Result<Option<String>, String> {
    let path = state
        .backend
        .get_clipboard_image()
        .await
        .map_err(|e| e.to_string())?;
    Ok(path.map(|p| p.to_string_lossy().into_owned()))
}

#[tauri::command]
pub async fn trigger_screenshot(state: State<'_, AppState>) -> Result<(), String> {
    state.backend.trigger_screenshot().map_err(|e| e.to_string())
}
