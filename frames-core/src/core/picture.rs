//! Validation of picture payloads attached to entries.

use crate::{FramesError, Result};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Checks that `bytes` is a recognised image that decodes completely.
///
/// # Errors
///
/// Returns [`FramesError::Validation`] if the payload is empty, its format
/// cannot be identified, or its header or pixel data fails to decode.
pub fn validate_picture(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(FramesError::Validation("Picture is empty".to_string()));
    }
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| FramesError::Validation("Picture format not recognised".to_string()))?;
    reader
        .decode()
        .map_err(|e| FramesError::Validation(format!("Picture could not be decoded: {e}")))?;
    Ok(format)
}

/// File extension used for a picture inside export archives.
pub(crate) fn picture_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("bin")
}

#[cfg(test)]
pub(crate) fn sample_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A PNG with an intact header whose IDAT payload is damaged and whose
/// IEND chunk is missing.
#[cfg(test)]
pub(crate) fn corrupt_png() -> Vec<u8> {
    let mut png = sample_png();
    let idat = png
        .windows(4)
        .position(|w| w == b"IDAT")
        .unwrap();
    for byte in &mut png[idat + 4..idat + 8] {
        *byte ^= 0xFF;
    }
    png.truncate(png.len() - 12);
    png
}
