//! Binarization: turn a color image into a foreground/background mask.
//!
//! Luma -> small Gaussian blur -> Otsu threshold -> polarity correction ->
//! morphological closing. The result always marks the silhouette with
//! 255 on a 0 background, whether the source drew dark ink on light
//! paper or the reverse.

use image::{GrayImage, Luma};
use imageproc::contrast::ThresholdType;
use imageproc::morphology::Mask;
use log::debug;

use crate::types::{BinaryMask, PipelineConfig, RgbaImage};
use crate::{blur, grayscale};

/// Mask value for the silhouette.
pub const FOREGROUND: u8 = 255;

/// Mask value for everything else.
pub const BACKGROUND: u8 = 0;

/// Mean mask value above which the mask is treated as inverted.
pub const POLARITY_SPLIT: f64 = 127.0;

/// Largest smoothing kernel or structuring element the stages will build.
pub const MAX_KERNEL_SIZE: u32 = 255;

/// Most dilate/erode passes [`close`] will run.
pub const MAX_CLOSE_ITERATIONS: u32 = 64;

/// Run the full binarization for one image.
///
/// Never fails: an image with no discernible shape yields an
/// all-background mask, and the missing contour is reported downstream.
#[must_use = "returns the binary mask"]
pub fn binarize(image: &RgbaImage, config: &PipelineConfig) -> BinaryMask {
    let gray = grayscale::to_luma(image);
    let blurred = blur::gaussian_blur(&gray, config.blur_kernel_size);
    let thresholded = otsu_threshold(&blurred);
    let corrected = correct_polarity(thresholded);
    close(
        &corrected,
        config.close_kernel_size,
        config.close_iterations,
    )
}

/// Threshold at the Otsu level: samples strictly above it become
/// [`FOREGROUND`], the rest [`BACKGROUND`].
#[must_use = "returns the thresholded image"]
pub fn otsu_threshold(gray: &GrayImage) -> GrayImage {
    let level = imageproc::contrast::otsu_level(gray);
    debug!("otsu level {level}");
    imageproc::contrast::threshold(gray, level, ThresholdType::Binary)
}

/// Mean sample value of a single-channel image (0 for an empty image).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_intensity(image: &GrayImage) -> f64 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = image.pixels().map(|p| u64::from(p.0[0])).sum();
    sum as f64 / count as f64
}

/// Flip the mask if most of it is foreground.
///
/// Downstream stages assume the silhouette is the minority, high-valued
/// class.
#[must_use = "returns the polarity-corrected mask"]
pub fn correct_polarity(mask: GrayImage) -> GrayImage {
    let mean = mean_intensity(&mask);
    if mean > POLARITY_SPLIT {
        debug!("mask mean {mean:.1} > {POLARITY_SPLIT}, inverting");
        invert(&mask)
    } else {
        mask
    }
}

/// Bitwise NOT of every sample.
#[must_use = "returns the inverted mask"]
pub fn invert(mask: &GrayImage) -> GrayImage {
    imageproc::map::map_pixels(mask, |Luma([v])| Luma([!v]))
}

/// Elliptical structuring element inscribed in a `size × size` square.
///
/// Row `i` spans `dx = round(r * sqrt(1 - ((i - r) / r)^2))` columns either
/// side of the centre, which makes size 3 the 4-connected cross. Even
/// sizes are rounded up and sizes above [`MAX_KERNEL_SIZE`] are clamped.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub fn ellipse_mask(size: u32) -> Mask {
    let size = (size | 1).min(MAX_KERNEL_SIZE);
    let r = i64::from(size / 2);
    let image = GrayImage::from_fn(size, size, |x, y| {
        if r == 0 {
            return Luma([FOREGROUND]);
        }
        let dy = i64::from(y) - r;
        let rf = r as f64;
        let dx = (rf * (1.0 - (dy * dy) as f64 / (rf * rf)).max(0.0).sqrt()).round() as i64;
        if (i64::from(x) - r).abs() <= dx {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });
    // size <= MAX_KERNEL_SIZE, so the centre fits in a u8.
    let center = (size / 2) as u8;
    Mask::from_image(&image, center, center)
}

/// Morphological closing: `iterations` dilations followed by as many
/// erosions with an elliptical element of the given size.
///
/// Bridges small gaps in thin strokes without materially thickening the
/// shape. Zero iterations return the mask unchanged; counts above
/// [`MAX_CLOSE_ITERATIONS`] are clamped.
#[must_use = "returns the closed mask"]
pub fn close(mask: &GrayImage, size: u32, iterations: u32) -> GrayImage {
    let iterations = iterations.min(MAX_CLOSE_ITERATIONS);
    if iterations == 0 {
        return mask.clone();
    }

    let element = ellipse_mask(size);
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = imageproc::morphology::grayscale_dilate(&out, &element);
    }
    for _ in 0..iterations {
        out = imageproc::morphology::grayscale_erode(&out, &element);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_foreground(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == FOREGROUND).count()
    }

    /// 40x40 image with a filled square at 10..30 on a contrasting field.
    fn square_image(ink: u8, paper: u8) -> RgbaImage {
        RgbaImage::from_fn(40, 40, |x, y| {
            let v = if (10..30).contains(&x) && (10..30).contains(&y) {
                ink
            } else {
                paper
            };
            image::Rgba([v, v, v, 255])
        })
    }

    #[test]
    fn mask_is_two_level() {
        let mask = binarize(&square_image(0, 255), &PipelineConfig::default());
        for p in mask.pixels() {
            assert!(p.0[0] == FOREGROUND || p.0[0] == BACKGROUND);
        }
    }

    #[test]
    fn dark_on_light_marks_the_square() {
        let mask = binarize(&square_image(0, 255), &PipelineConfig::default());
        assert_eq!(mask.get_pixel(20, 20).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(2, 2).0[0], BACKGROUND);
    }

    #[test]
    fn light_on_dark_marks_the_square() {
        let mask = binarize(&square_image(255, 0), &PipelineConfig::default());
        assert_eq!(mask.get_pixel(20, 20).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(2, 2).0[0], BACKGROUND);
    }

    #[test]
    fn blank_image_is_all_background() {
        for v in [0, 128, 255] {
            let img = RgbaImage::from_pixel(16, 16, image::Rgba([v, v, v, 255]));
            let mask = binarize(&img, &PipelineConfig::default());
            assert_eq!(count_foreground(&mask), 0, "uniform level {v}");
        }
    }

    #[test]
    fn mean_of_empty_image_is_zero() {
        assert!(mean_intensity(&GrayImage::new(0, 0)).abs() < f64::EPSILON);
    }

    #[test]
    fn majority_foreground_is_inverted() {
        let mut mask = GrayImage::from_pixel(10, 10, Luma([FOREGROUND]));
        mask.put_pixel(0, 0, Luma([BACKGROUND]));
        let corrected = correct_polarity(mask);
        assert_eq!(count_foreground(&corrected), 1);
        assert_eq!(corrected.get_pixel(0, 0).0[0], FOREGROUND);
    }

    #[test]
    fn minority_foreground_is_kept() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(3, 3, Luma([FOREGROUND]));
        let corrected = correct_polarity(mask.clone());
        assert_eq!(corrected, mask);
    }

    #[test]
    fn invert_flips_all_values() {
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(1, 1, Luma([255]));
        let inverted = invert(&img);
        assert_eq!(inverted.get_pixel(1, 1).0[0], 0);
        assert_eq!(inverted.get_pixel(2, 2).0[0], 255);
    }

    #[test]
    fn closing_bridges_one_pixel_gap() {
        // Three-pixel-thick bar on rows 4..=6 with a one-column break at x=10.
        let mask = GrayImage::from_fn(21, 11, |x, y| {
            if (4..=6).contains(&y) && x != 10 && (2..19).contains(&x) {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });
        let closed = close(&mask, 3, 1);
        assert_eq!(closed.get_pixel(10, 5).0[0], FOREGROUND);
        // The bar is not thickened.
        assert_eq!(closed.get_pixel(5, 3).0[0], BACKGROUND);
        assert_eq!(closed.get_pixel(5, 7).0[0], BACKGROUND);
    }

    #[test]
    fn closing_preserves_filled_square() {
        let mask = GrayImage::from_fn(20, 20, |x, y| {
            if (5..15).contains(&x) && (5..15).contains(&y) {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });
        assert_eq!(close(&mask, 3, 1), mask);
    }

    /// Stamp the element onto a single foreground pixel and draw it.
    fn element_rows(size: u32) -> Vec<String> {
        let side = size | 1;
        let mut seed = GrayImage::new(side, side);
        seed.put_pixel(side / 2, side / 2, Luma([FOREGROUND]));
        let stamped = imageproc::morphology::grayscale_dilate(&seed, &ellipse_mask(size));
        (0..side)
            .map(|y| {
                (0..side)
                    .map(|x| {
                        if stamped.get_pixel(x, y).0[0] == FOREGROUND {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn size_three_element_is_a_cross() {
        assert_eq!(element_rows(3), vec![".#.", "###", ".#."]);
    }

    #[test]
    fn size_five_element_is_an_ellipse() {
        assert_eq!(
            element_rows(5),
            vec!["..#..", "#####", "#####", "#####", "..#.."]
        );
    }

    #[test]
    fn size_one_element_is_a_single_pixel() {
        assert_eq!(element_rows(1), vec!["#"]);
    }

    #[test]
    fn oversized_element_is_clamped() {
        // A one-row image only sees the element's middle row, which spans
        // the full clamped width.
        for size in [1001, u32::MAX] {
            let mut seed = GrayImage::new(301, 1);
            seed.put_pixel(150, 0, Luma([FOREGROUND]));
            let stamped = imageproc::morphology::grayscale_dilate(&seed, &ellipse_mask(size));
            assert_eq!(count_foreground(&stamped), MAX_KERNEL_SIZE as usize, "size {size}");
            assert_eq!(stamped.get_pixel(150 - 127, 0).0[0], FOREGROUND);
            assert_eq!(stamped.get_pixel(150 - 128, 0).0[0], BACKGROUND);
        }
    }

    #[test]
    fn excessive_iterations_are_clamped() {
        let mut mask = GrayImage::new(8, 8);
        mask.put_pixel(2, 2, Luma([FOREGROUND]));
        assert_eq!(
            close(&mask, 3, u32::MAX),
            close(&mask, 3, MAX_CLOSE_ITERATIONS)
        );
    }

    #[test]
    fn zero_iterations_is_identity() {
        let mut mask = GrayImage::new(8, 8);
        mask.put_pixel(2, 2, Luma([FOREGROUND]));
        assert_eq!(close(&mask, 3, 0), mask);
    }
}
