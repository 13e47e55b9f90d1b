pub mod backend;
pub mod capture;
mod commands;
pub mod config;
mod events;
pub mod gateway;
pub mod ui;
mod utils;
pub mod vision;
mod window;

use std::{path::PathBuf, sync::Arc};

use backend::Backend;
use capture::SystemClipboard;
use commands::{
    backend::{
        get_api_config, get_clipboard_image, process_image, save_api_config,
        test_api_connection, trigger_screenshot, validate_api_config,
    },
    settings::{
        close_settings, edit_settings, get_settings_surface, open_settings, save_settings,
        test_settings,
    },
    view::{
        capture_screenshot, choose_image, copy_result, get_session, paste_image, recognize,
        select_image,
    },
};
use config::ConfigStore;
use events::EventNotifier;
use gateway::Gateway;
use log::warn;
use tauri::{Manager, RunEvent};
use ui::{settings::DEFAULT_CLOSE_DELAY, RetryPolicy, SettingsSurface, ViewController};
use window::setup_window_centered;

pub(crate) struct AppState {
    pub(crate) backend: Backend,
    pub(crate) view: Arc<ViewController>,
    pub(crate) settings: Arc<SettingsSurface>,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Reads RUST_LOG, defaults to info
    utils::logging::init();

    log::info!("AiTex starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let config_dir = app.path().app_config_dir().unwrap_or_else(|err| {
                    warn!("No app config directory ({err}); falling back to ./.aitex");
                    PathBuf::from(".aitex")
                });
                let store = Arc::new(ConfigStore::in_dir(&config_dir)?);
                log::info!("Using config file {}", store.path().display());

                let backend = Backend::new(store)?;
                let gateway = Gateway::new(Arc::new(backend.clone()));
                let notifier = Arc::new(EventNotifier::new(app.handle().clone()));

                let policy = RetryPolicy::from_env();
                log::info!(
                    "Screenshot polling: {} attempts, base delay {:?}",
                    policy.attempts,
                    policy.base_delay
                );

                let view = Arc::new(ViewController::new(
                    gateway.clone(),
                    policy,
                    notifier.clone(),
                    Arc::new(SystemClipboard::new()),
                ));
                let settings = Arc::new(SettingsSurface::new(
                    gateway,
                    notifier,
                    DEFAULT_CLOSE_DELAY,
                ));

                events::forward_snapshots(
                    app.handle().clone(),
                    events::SESSION_CHANGED,
                    view.subscribe(),
                );
                events::forward_snapshots(
                    app.handle().clone(),
                    events::SETTINGS_CHANGED,
                    settings.subscribe(),
                );

                app.manage(AppState {
                    backend,
                    view,
                    settings,
                });

                if let Some(main) = app.get_webview_window("main") {
                    if let Err(err) = window::center_on_current_monitor(&main) {
                        warn!("Could not center main window: {err}");
                    }
                }

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_api_config,
            validate_api_config,
            save_api_config,
            test_api_connection,
            process_image,
            get_clipboard_image,
            trigger_screenshot,
            setup_window_centered,
            get_session,
            select_image,
            choose_image,
            paste_image,
            capture_screenshot,
            recognize,
            copy_result,
            get_settings_surface,
            open_settings,
            edit_settings,
            test_settings,
            save_settings,
            close_settings,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| {
            if let RunEvent::Exit = event {
                if let Some(state) = app_handle.try_state::<AppState>() {
                    state.backend.discard_captures();
                }
            }
        });
}
