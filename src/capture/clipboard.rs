use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use arboard::Clipboard;
use image::RgbImage;

use crate::backend::BackendError;
use crate::ui::view::ClipboardWriter;
use crate::vision::preprocess::encode_png;

/// Read the clipboard image, if any, into a kept temporary PNG.
///
/// Blocking; call from `spawn_blocking`.
pub fn read_image_to_temp() -> Result<Option<PathBuf>, BackendError> {
    let mut clipboard = Clipboard::new().map_err(BackendError::Clipboard)?;

    let image = match clipboard.get_image() {
        Ok(image) => image,
        Err(arboard::Error::ContentNotAvailable) => return Ok(None),
        Err(err) => return Err(BackendError::Clipboard(err)),
    };

    let rgb = rgba_to_rgb(image.width, image.height, &image.bytes)
        .ok_or(BackendError::InvalidClipboardImage)?;
    let png = encode_png(&rgb)?;

    let mut file = tempfile::Builder::new()
        .prefix("aitex-clipboard-")
        .suffix(".png")
        .tempfile()?;
    file.write_all(&png)?;
    let (_, path) = file
        .keep()
        .map_err(|err| BackendError::Io(err.error))?;

    log::info!("Clipboard image ({}x{}) saved to {}", rgb.width(), rgb.height(), path.display());
    Ok(Some(path))
}

/// Drop the alpha channel of tightly packed RGBA rows.
pub fn rgba_to_rgb(width: usize, height: usize, rgba: &[u8]) -> Option<RgbImage> {
    let expected = width.checked_mul(height)?.checked_mul(4)?;
    if rgba.len() < expected {
        return None;
    }
    let rgb: Vec<u8> = rgba[..expected]
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    RgbImage::from_raw(u32::try_from(width).ok()?, u32::try_from(height).ok()?, rgb)
}

/// The clipboard PNG currently handed to the view.
///
/// Each paste or screenshot replaces the previous capture, so only the latest
/// file is kept on disk; `clear` removes that one at exit.
#[derive(Default)]
pub struct ClipboardTempFiles {
    current: Mutex<Option<PathBuf>>,
}

impl ClipboardTempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` as the live capture and delete the one it replaces.
    pub fn track(&self, path: PathBuf) {
        let previous = match self.current.lock() {
            Ok(mut guard) => guard.replace(path),
            Err(poisoned) => poisoned.into_inner().replace(path),
        };
        if let Some(previous) = previous {
            remove_quietly(&previous);
        }
    }

    pub fn clear(&self) {
        let current = match self.current.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(path) = current {
            remove_quietly(&path);
        }
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed clipboard capture {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("Failed to remove {}: {err}", path.display()),
    }
}

/// Text clipboard kept alive for the app's lifetime.
///
/// On X11 the selection is served by the `Clipboard` owner, so dropping it
/// right after `set_text` can lose the copy.
pub struct SystemClipboard {
    inner: Mutex<Option<Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), String> {
        let mut guard = self.inner.lock().map_err(|e| e.to_string())?;
        if guard.is_none() {
            *guard = Some(Clipboard::new().map_err(|e| format!("Failed to open clipboard: {e}"))?);
        }
        match guard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_owned())
                .map_err(|e| format!("Failed to write clipboard: {e}")),
            None => Err("Clipboard unavailable".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn strips_alpha() {
        let rgba = [1, 2, 3, 255, 4, 5, 6, 0];
        let img = rgba_to_rgb(2, 1, &rgba).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgb([1, 2, 3]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([4, 5, 6]));
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(rgba_to_rgb(2, 2, &[0; 12]).is_none());
    }

    #[test]
    fn newer_capture_deletes_the_previous_one() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("aitex-clipboard-1.png");
        let second = dir.path().join("aitex-clipboard-2.png");
        fs::write(&first, b"png").unwrap();
        fs::write(&second, b"png").unwrap();

        let files = ClipboardTempFiles::new();
        files.track(first.clone());
        assert!(first.exists());

        files.track(second.clone());
        assert!(!first.exists());
        assert!(second.exists());

        files.clear();
        assert!(!second.exists());
        files.clear();
    }

    #[test]
    fn already_deleted_capture_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let files = ClipboardTempFiles::new();
        files.track(dir.path().join("gone.png"));
        files.track(dir.path().join("also-gone.png"));
        files.clear();
    }
}
