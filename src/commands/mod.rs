//! Tauri IPC surface.
//!
//! `backend` exposes the raw gateway operations; `view` and `settings` drive
//! the presentation core, whose state reaches the webview as events.

pub mod backend;
pub mod settings;
pub mod view;
