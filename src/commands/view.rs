use std::path::PathBuf;

use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;
use tokio::sync::oneshot;

use crate::{ui::RecognitionSession, AppState};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

#[tauri::command]
pub fn get_session(state: State<AppState>) -> RecognitionSession {
    state.view.session()
}

#[tauri::command]
pub fn select_image(path: String, state: State<AppState>) -> RecognitionSession {
    state.view.select_image(PathBuf::from(path))
}

/// Open the native file picker and show the chosen image.
#[tauri::command]
pub async fn choose_image(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<RecognitionSession, String> {
    let (tx, rx) = oneshot::channel();
    app.dialog()
        .file()
        .set_title("Select an image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file(move |picked| {
            let _ = tx.send(picked);
        });

    let picked = match rx.await.map_err(|e| e.to_string())? {
        Some(file) => Some(file.into_path().map_err(|e| e.to_string())?),
        None => None,
    };
    Ok(state.view.select_picked(picked))
}

#[tauri::command]
pub async fn paste_image(state: State<'_, AppState>) -> Result<RecognitionSession, String> {
    Ok(state.view.paste().await)
}

#[tauri::command]
pub async fn capture_screenshot(state: State<'_, AppState>) -> Result<RecognitionSession, String> {
    let report = state.view.capture_screenshot().await;
    log::info!(
        "Screenshot acquisition finished: {:?} after {} attempt(s)",
        report.outcome,
        report.attempts.len()
    );
    Ok(state.view.session())
}

#[tauri::command]
pub async fn recognize(state: State<'_, AppState>) -> Result<RecognitionSession, String> {
    Ok(state.view.recognize().await)
}

#[tauri::command]
pub fn copy_result(state: State<AppState>) -> bool {
    state.view.copy_result()
}
