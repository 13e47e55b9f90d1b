pub mod clipboard;
pub mod screenshot;

pub use clipboard::{ClipboardTempFiles, SystemClipboard};
