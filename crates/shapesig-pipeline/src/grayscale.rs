//! Luma conversion: the first step of binarization.

use image::{GrayImage, Luma, Rgba};

use crate::types::RgbaImage;

/// Fixed-point BT.601 weights, scaled by `1 << LUMA_SHIFT`.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;
const _: () = assert!(LUMA_R + LUMA_G + LUMA_B == 1 << LUMA_SHIFT);

/// Convert an RGBA image to single-channel intensity.
///
/// Uses the standard luminance weighting `0.299*R + 0.587*G + 0.114*B`,
/// rounded to nearest. Alpha is ignored.
#[must_use = "returns the grayscale image"]
pub fn to_luma(image: &RgbaImage) -> GrayImage {
    imageproc::map::map_pixels(image, |Rgba([r, g, b, _])| Luma([luma(r, g, b)]))
}

#[allow(clippy::cast_possible_truncation)]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B;
    // Weights sum to 1 << LUMA_SHIFT, so the result fits in a u8.
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}
