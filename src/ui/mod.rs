//! Headless presentation core: owns what the webview shows and decides when
//! to call the backend. The webview renders snapshots and forwards clicks.

pub mod acquisition;
pub mod alerts;
pub mod session;
pub mod settings;
pub mod view;

pub use acquisition::{AcquisitionReport, RetryPolicy};
pub use alerts::Notifier;
pub use session::{RecognitionSession, SessionStore};
pub use settings::{SaveOutcome, SettingsSnapshot, SettingsSurface};
pub use view::{ClipboardWriter, ViewController};
