use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::sync::watch;

use crate::ui::Notifier;

pub const SESSION_CHANGED: &str = "session-changed";
pub const SETTINGS_CHANGED: &str = "settings-changed";
pub const ALERT: &str = "alert";

/// Delivers alerts to the webview, which shows them with `window.alert`.
pub struct EventNotifier {
    app_handle: AppHandle,
}

impl EventNotifier {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl Notifier for EventNotifier {
    fn alert(&self, message: &str) {
        if let Err(err) = self.app_handle.emit(ALERT, message) {
            log::warn!("Failed to emit alert '{message}': {err}");
        }
    }
}

/// Re-emit every snapshot published on `rx` as `event`.
pub fn forward_snapshots<T>(app_handle: AppHandle, event: &'static str, mut rx: watch::Receiver<T>)
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    tauri::async_runtime::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if let Err(err) = app_handle.emit(event, snapshot) {
                log::warn!("Failed to emit {event}: {err}");
            }
        }
        log::debug!("{event} forwarder stopped");
    });
}
