//! Small-kernel Gaussian smoothing before thresholding.
//!
//! The kernel size is fixed by the caller rather than derived from a
//! sigma, so a size-3 blur only ever touches the immediate neighbours.
//! That removes single-pixel speckle without erasing one-pixel strokes.
//!
//! Borders are mirrored without repeating the edge sample
//! (`dcb|abcd|cba`, not `aaa|abcd|ddd`), so a shape touching the frame
//! is not smeared outwards by replicated edge pixels.

use image::GrayImage;

use crate::binarize::MAX_KERNEL_SIZE;

/// Binomial kernels used for the common small sizes.
const KERNEL_1: [f32; 1] = [1.0];
const KERNEL_3: [f32; 3] = [0.25, 0.5, 0.25];
const KERNEL_5: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];
const KERNEL_7: [f32; 7] = [
    0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
];

/// Build the normalized 1-D Gaussian kernel for an odd `size`.
///
/// Sizes 1, 3, 5 and 7 use fixed binomial weights. Larger sizes sample a
/// Gaussian with `sigma = 0.3 * ((size - 1) * 0.5 - 1) + 0.8`. An even
/// size is rounded up to the next odd one and sizes above
/// [`MAX_KERNEL_SIZE`] are clamped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = (size | 1).min(MAX_KERNEL_SIZE);
    match size {
        1 => KERNEL_1.to_vec(),
        3 => KERNEL_3.to_vec(),
        5 => KERNEL_5.to_vec(),
        7 => KERNEL_7.to_vec(),
        _ => {
            let sigma = 0.3f32.mul_add((size as f32 - 1.0).mul_add(0.5, -1.0), 0.8);
            let half = (size / 2) as f32;
            let scale = -0.5 / (sigma * sigma);
            let raw: Vec<f32> = (0..size)
                .map(|i| {
                    let x = i as f32 - half;
                    (scale * x * x).exp()
                })
                .collect();
            let sum: f32 = raw.iter().sum();
            raw.into_iter().map(|w| w / sum).collect()
        }
    }
}

/// Apply a separable `size × size` Gaussian blur to a grayscale image.
///
/// A size of 1 (or 0) returns the image unchanged.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &GrayImage, size: u32) -> GrayImage {
    if size <= 1 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(size);
    let radius = (size | 1).min(MAX_KERNEL_SIZE) / 2;
    let padded = pad_reflect_101(image, radius);
    let filtered = imageproc::filter::separable_filter_equal(&padded, &kernel);
    image::imageops::crop_imm(&filtered, radius, radius, image.width(), image.height()).to_image()
}

/// Grow `image` by `pad` pixels on every side, mirroring about the edge
/// samples.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pad_reflect_101(image: &GrayImage, pad: u32) -> GrayImage {
    let (w, h) = (i64::from(image.width()), i64::from(image.height()));
    let p = i64::from(pad);
    GrayImage::from_fn(image.width() + 2 * pad, image.height() + 2 * pad, |x, y| {
        let sx = reflect_101(i64::from(x) - p, w);
        let sy = reflect_101(i64::from(y) - p, h);
        *image.get_pixel(sx as u32, sy as u32)
    })
}

/// Map `i` into `0..len` by mirroring about the first and last index.
const fn reflect_101(i: i64, len: i64) -> i64 {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let m = i.rem_euclid(period);
    if m < len { m } else { period - m }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image with a sharp black-to-white boundary at x=5.
    fn sharp_edge_image() -> GrayImage {
        GrayImage::from_fn(10, 10, |x, _y| {
            if x < 5 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        })
    }

    #[test]
    fn kernels_are_normalized() {
        for size in [1, 3, 5, 7, 9, 15] {
            let kernel = gaussian_kernel(size);
            assert_eq!(kernel.len(), size as usize);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "size {size}: sum {sum}");
        }
    }

    #[test]
    fn kernels_are_symmetric() {
        let kernel = gaussian_kernel(11);
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn oversized_kernel_is_clamped() {
        assert_eq!(gaussian_kernel(1001).len(), MAX_KERNEL_SIZE as usize);
        assert_eq!(gaussian_kernel(u32::MAX).len(), MAX_KERNEL_SIZE as usize);
    }

    #[test]
    fn huge_size_blurs_without_exhausting_memory() {
        let img = sharp_edge_image();
        let blurred = gaussian_blur(&img, u32::MAX);
        assert_eq!(blurred.dimensions(), (10, 10));
    }

    #[test]
    fn reflect_101_mirrors_without_repeating_the_edge() {
        let mapped: Vec<i64> = (-3..11).map(|i| reflect_101(i, 8)).collect();
        assert_eq!(mapped, vec![3, 2, 1, 0, 1, 2, 3, 4, 5, 6, 7, 6, 5, 4]);
        assert_eq!(reflect_101(-5, 1), 0);
    }

    #[test]
    fn border_pixels_are_mirrored() {
        // Bright first column on black: replicating the edge would keep
        // three quarters of it, mirroring keeps half.
        let img = GrayImage::from_fn(10, 3, |x, _| {
            if x == 0 {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        });
        let blurred = gaussian_blur(&img, 3);
        for y in 0..3 {
            let v = blurred.get_pixel(0, y).0[0];
            assert!((120..=135).contains(&v), "row {y}: {v}");
            let next = blurred.get_pixel(1, y).0[0];
            assert!((60..=70).contains(&next), "row {y}: {next}");
        }
    }

    #[test]
    fn single_pixel_image_survives_blur() {
        let img = GrayImage::from_pixel(1, 1, image::Luma([77]));
        assert_eq!(gaussian_blur(&img, 5), img);
    }

    #[test]
    fn even_size_rounds_up() {
        assert_eq!(gaussian_kernel(4).len(), 5);
    }

    #[test]
    fn size_one_returns_identical_image() {
        let img = sharp_edge_image();
        let blurred = gaussian_blur(&img, 1);
        assert_eq!(img, blurred);
    }

    #[test]
    fn output_dimensions_preserved() {
        let img = GrayImage::new(17, 31);
        let blurred = gaussian_blur(&img, 3);
        assert_eq!(blurred.width(), 17);
        assert_eq!(blurred.height(), 31);
    }

    #[test]
    fn blur_smooths_sharp_edge() {
        let img = sharp_edge_image();
        let blurred = gaussian_blur(&img, 3);

        let left_of_edge = blurred.get_pixel(4, 5).0[0];
        let right_of_edge = blurred.get_pixel(5, 5).0[0];

        assert!(
            left_of_edge > 0,
            "expected blur to raise left-of-edge above 0, got {left_of_edge}",
        );
        assert!(
            right_of_edge < 255,
            "expected blur to lower right-of-edge below 255, got {right_of_edge}",
        );
    }

    #[test]
    fn size_three_only_reaches_neighbours() {
        let img = sharp_edge_image();
        let blurred = gaussian_blur(&img, 3);
        assert_eq!(blurred.get_pixel(3, 5).0[0], 0);
        assert_eq!(blurred.get_pixel(6, 5).0[0], 255);
    }

    #[test]
    fn uniform_image_unchanged_by_blur() {
        let img = GrayImage::from_fn(10, 10, |_, _| image::Luma([128]));
        let blurred = gaussian_blur(&img, 5);
        for pixel in blurred.pixels() {
            let diff = i16::from(pixel.0[0]) - 128;
            assert!(
                diff.abs() <= 1,
                "expected uniform image to stay near 128 after blur, got {}",
                pixel.0[0],
            );
        }
    }
}
