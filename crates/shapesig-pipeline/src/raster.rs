//! Raster boundary: decoding image files and packed-ARGB pixel buffers.
//!
//! The pipeline itself works on [`RgbaImage`]. Hosts that hand over
//! pixels as one packed 32-bit integer per pixel (alpha, red, green,
//! blue, most significant byte first) convert with [`rgba_from_argb`]
//! and [`rgba_to_argb`].

use crate::types::{PipelineError, RgbaImage};

/// Decode raw image bytes (PNG, JPEG, BMP, WebP) into RGBA.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded image"]
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Unpack row-major ARGB samples into an RGBA image.
///
/// # Errors
///
/// Returns [`PipelineError::BufferSize`] if `pixels.len()` is not
/// `width * height`.
#[must_use = "returns the unpacked image"]
pub fn rgba_from_argb(width: u32, height: u32, pixels: &[u32]) -> Result<RgbaImage, PipelineError> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(PipelineError::BufferSize {
            expected,
            actual: pixels.len(),
        });
    }

    let raw: Vec<u8> = pixels
        .iter()
        .flat_map(|&p| {
            let [a, r, g, b] = p.to_be_bytes();
            [r, g, b, a]
        })
        .collect();

    RgbaImage::from_raw(width, height, raw).ok_or(PipelineError::BufferSize {
        expected,
        actual: pixels.len(),
    })
}

/// Pack an RGBA image into row-major ARGB samples.
#[must_use]
pub fn rgba_to_argb(image: &RgbaImage) -> Vec<u32> {
    image
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            u32::from_be_bytes([a, r, g, b])
        })
        .collect()
}
