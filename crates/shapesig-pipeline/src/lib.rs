//! shapesig-pipeline: Fourier shape descriptors from raster silhouettes
//! (sans-IO).
//!
//! Turns an image holding one dominant drawn or photographed shape into a
//! fixed-length descriptor that does not change when the shape is moved,
//! scaled or rotated, and compares descriptors by Euclidean distance:
//!
//! binarize -> largest contour -> complex signature -> normalized
//! spectrum -> distance.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! images and returns plain data. Every call is independent; no state is
//! kept between calls, so the pipeline may run concurrently on separate
//! images without synchronization.
//!
//! Shape-level failures are data, not errors: an image with no shape
//! yields an empty signature and an empty descriptor, and incomparable
//! descriptors have distance [`INVALID_DISTANCE`].

pub mod binarize;
pub mod blur;
pub mod contour;
pub mod descriptor;
pub mod distance;
pub mod evaluate;
pub mod grayscale;
pub mod raster;
pub mod render;
pub mod signature;
pub mod types;

pub use contour::{ContourTracer, ContourTracerKind};
pub use distance::{INVALID_DISTANCE, euclidean_distance};
pub use evaluate::{Evaluation, Sample};
pub use types::{
    BinaryMask, ComplexSignature, Contour, Descriptor, Dimensions, GrayImage, GridPoint,
    PipelineConfig, PipelineError, RgbaImage, ShapeAnalysis,
};

/// Run the whole pipeline once, keeping every stage output.
///
/// # Pipeline steps
///
/// 1. Binarize: luma, blur, Otsu threshold, polarity fix, closing
/// 2. Trace external contours and keep the largest by area
/// 3. Build the centroid-relative complex signature
/// 4. Normalize the signature's spectrum into `config.descriptor_len`
///    entries
///
/// When no contour is found the signature and descriptor are empty.
#[must_use]
pub fn analyze(image: &RgbaImage, config: &PipelineConfig) -> ShapeAnalysis {
    let dimensions = Dimensions {
        width: image.width(),
        height: image.height(),
    };

    let mask = binarize::binarize(image, config);
    let contour = contour::largest_contour(&mask, &config.contour_tracer);
    let signature = contour
        .as_ref()
        .map(signature::complex_signature)
        .unwrap_or_default();
    let descriptor = descriptor::normalized_descriptor(&signature, config.descriptor_len);

    ShapeAnalysis {
        mask,
        contour,
        signature,
        descriptor,
        dimensions,
    }
}

/// Binarize `image` and render the mask as an opaque gray image.
#[must_use]
pub fn binarize(image: &RgbaImage, config: &PipelineConfig) -> RgbaImage {
    render::render_mask(&binarize::binarize(image, config))
}

/// Draw the selected contour of `image` on a blank opaque canvas.
///
/// The canvas stays blank when no contour is found.
#[must_use]
pub fn find_contour_overlay(image: &RgbaImage, config: &PipelineConfig) -> RgbaImage {
    let mask = binarize::binarize(image, config);
    let contour = contour::largest_contour(&mask, &config.contour_tracer);
    render::render_contour(
        contour.as_ref(),
        Dimensions {
            width: image.width(),
            height: image.height(),
        },
        config.contour_thickness,
    )
}

/// Complex signature of the shape in `image`, flattened to
/// `[re0, im0, re1, im1, ...]`. Empty when no contour is found.
#[must_use]
pub fn compute_complex_signature(image: &RgbaImage, config: &PipelineConfig) -> Vec<f32> {
    let mask = binarize::binarize(image, config);
    contour::largest_contour(&mask, &config.contour_tracer)
        .map(|c| signature::complex_signature(&c).to_interleaved())
        .unwrap_or_default()
}

/// Normalized descriptor of a flattened signature.
///
/// `k <= 0` selects the default length of 32. Returns exactly `k` values,
/// or an empty vector when the signature holds fewer than two complex
/// samples (fewer than four values).
#[must_use]
pub fn compute_normalized_descriptor(signature: &[f32], k: i32) -> Vec<f32> {
    let signature = ComplexSignature::from_interleaved(signature);
    descriptor::normalized_descriptor(&signature, descriptor::resolve_len(k)).into_values()
}
