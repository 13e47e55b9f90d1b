use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, RgbImage};

use crate::backend::BackendError;

/// Mean luma below which an image is treated as light-on-dark.
const DARK_BACKGROUND_THRESHOLD: u64 = 128;

/// Decode, normalize to dark-on-light RGB, and return a base64 PNG.
pub fn prepare_for_upload(bytes: &[u8]) -> Result<String, BackendError> {
    let decoded = image::load_from_memory(bytes)?;
    let mut rgb = decoded.to_rgb8();

    if mean_luma(&rgb) < DARK_BACKGROUND_THRESHOLD {
        invert(&mut rgb);
    }

    let png = encode_png(&rgb)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(png))
}

/// Integer BT.601 luma averaged over every pixel.
pub fn mean_luma(img: &RgbImage) -> u64 {
    let pixel_count = u64::from(img.width()) * u64::from(img.height());
    if pixel_count == 0 {
        return 0;
    }
    let sum: u64 = img
        .pixels()
        .map(|p| (u64::from(p[0]) * 299 + u64::from(p[1]) * 587 + u64::from(p[2]) * 114) / 1000)
        .sum();
    sum / pixel_count
}

pub fn invert(img: &mut RgbImage) {
    for channel in img.iter_mut() {
        *channel = 255 - *channel;
    }
}

pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
