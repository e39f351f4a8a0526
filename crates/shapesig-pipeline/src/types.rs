//! Shared types for the shape-signature pipeline.

use geo::{Coord, LineString, Polygon};
use rustfft::num_complex::Complex32;
use serde::{Deserialize, Serialize};

use crate::contour::ContourTracerKind;

/// Re-export `GrayImage` so downstream crates can reference the binary
/// mask without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can hand the pipeline a
/// decoded image without depending on `image` directly.
pub use image::RgbaImage;

/// A two-level mask: 255 marks the silhouette, 0 the background.
pub type BinaryMask = GrayImage;

/// An integer pixel coordinate on a traced boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column (pixels from left edge).
    pub x: i32,
    /// Row (pixels from top edge).
    pub y: i32,
}

impl GridPoint {
    /// Create a new grid point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The closed outer boundary of one connected foreground region.
///
/// Point order and starting point are whatever the tracer produced; the
/// closing edge from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour(Vec<GridPoint>);

impl Contour {
    /// Create a contour from traced points.
    #[must_use]
    pub const fn new(points: Vec<GridPoint>) -> Self {
        Self(points)
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the contour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.0
    }

    /// Consumes the contour and returns the underlying points.
    #[must_use]
    pub fn into_points(self) -> Vec<GridPoint> {
        self.0
    }

    /// Returns a copy of this contour shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self(
            self.0
                .iter()
                .map(|p| GridPoint::new(p.x + dx, p.y + dy))
                .collect(),
        )
    }

    /// View the contour as a closed `geo` polygon with no holes.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .0
            .iter()
            .map(|p| Coord {
                x: f64::from(p.x),
                y: f64::from(p.y),
            })
            .collect();
        Polygon::new(LineString::new(coords), vec![])
    }
}

/// Centroid-relative boundary signal: one complex sample per contour
/// point, `(x - cx) + i(y - cy)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexSignature(Vec<Complex32>);

impl ComplexSignature {
    /// Create a signature from complex samples.
    #[must_use]
    pub const fn new(samples: Vec<Complex32>) -> Self {
        Self(samples)
    }

    /// Rebuild a signature from an interleaved `[re0, im0, re1, im1, ...]`
    /// slice. A trailing unpaired value is ignored.
    #[must_use]
    pub fn from_interleaved(values: &[f32]) -> Self {
        Self(
            values
                .chunks_exact(2)
                .map(|pair| Complex32::new(pair[0], pair[1]))
                .collect(),
        )
    }

    /// Flatten to `[re0, im0, re1, im1, ...]`.
    #[must_use]
    pub fn to_interleaved(&self) -> Vec<f32> {
        self.0.iter().flat_map(|c| [c.re, c.im]).collect()
    }

    /// Returns `true` if the signature has no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of complex samples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all samples.
    #[must_use]
    pub fn samples(&self) -> &[Complex32] {
        &self.0
    }
}

/// Fixed-length, scale- and rotation-normalized Fourier magnitudes.
///
/// The empty descriptor means "no shape"; it is distinct from a
/// descriptor of zeros.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor(Vec<f32>);

impl Descriptor {
    /// Create a descriptor from normalized magnitudes.
    #[must_use]
    pub const fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// The "no shape" descriptor.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if this is the "no shape" descriptor.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all entries.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// Consumes the descriptor and returns its entries.
    #[must_use]
    pub fn into_values(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean distance to `other`, or `None` when the two are not
    /// comparable (different lengths, or either is empty).
    #[must_use]
    pub fn distance(&self, other: &Self) -> Option<f32> {
        crate::distance::euclidean(&self.0, &other.0)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Configuration for the shape-signature pipeline.
///
/// Fields are public; call [`validate`](Self::validate) before use when
/// the values come from outside the program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Size of the square smoothing kernel applied before thresholding.
    /// Must be odd.
    pub blur_kernel_size: u32,

    /// Size of the elliptical structuring element used for closing.
    /// Must be odd.
    pub close_kernel_size: u32,

    /// Number of dilate/erode passes in the closing step.
    pub close_iterations: u32,

    /// Which contour tracing algorithm to use.
    pub contour_tracer: ContourTracerKind,

    /// Number of descriptor entries produced by [`crate::analyze`].
    pub descriptor_len: usize,

    /// Stroke width, in pixels, of the contour overlay.
    pub contour_thickness: f32,
}

impl PipelineConfig {
    /// Default smoothing kernel size.
    pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 3;
    /// Default closing structuring-element size.
    pub const DEFAULT_CLOSE_KERNEL_SIZE: u32 = 3;
    /// Default closing iteration count.
    pub const DEFAULT_CLOSE_ITERATIONS: u32 = 1;
    /// Default descriptor length.
    pub const DEFAULT_DESCRIPTOR_LEN: usize = 32;
    /// Default overlay stroke width.
    pub const DEFAULT_CONTOUR_THICKNESS: f32 = 2.0;

    /// Check the configuration for values the pipeline cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for an even, zero or
    /// oversized kernel size, too many closing iterations, a zero
    /// descriptor length, or a thickness that is not a positive finite
    /// number.
    pub fn validate(&self) -> Result<(), PipelineError> {
        use crate::binarize::{MAX_CLOSE_ITERATIONS, MAX_KERNEL_SIZE};

        if self.blur_kernel_size % 2 == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_kernel_size must be odd, got {}",
                self.blur_kernel_size
            )));
        }
        if self.blur_kernel_size > MAX_KERNEL_SIZE {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_kernel_size must be at most {MAX_KERNEL_SIZE}, got {}",
                self.blur_kernel_size
            )));
        }
        if self.close_kernel_size % 2 == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "close_kernel_size must be odd, got {}",
                self.close_kernel_size
            )));
        }
        if self.close_kernel_size > MAX_KERNEL_SIZE {
            return Err(PipelineError::InvalidConfig(format!(
                "close_kernel_size must be at most {MAX_KERNEL_SIZE}, got {}",
                self.close_kernel_size
            )));
        }
        if self.close_iterations > MAX_CLOSE_ITERATIONS {
            return Err(PipelineError::InvalidConfig(format!(
                "close_iterations must be at most {MAX_CLOSE_ITERATIONS}, got {}",
                self.close_iterations
            )));
        }
        if self.descriptor_len == 0 {
            return Err(PipelineError::InvalidConfig(
                "descriptor_len must be at least 1".to_string(),
            ));
        }
        if !(self.contour_thickness.is_finite() && self.contour_thickness > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "contour_thickness must be positive, got {}",
                self.contour_thickness
            )));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: Self::DEFAULT_BLUR_KERNEL_SIZE,
            close_kernel_size: Self::DEFAULT_CLOSE_KERNEL_SIZE,
            close_iterations: Self::DEFAULT_CLOSE_ITERATIONS,
            contour_tracer: ContourTracerKind::default(),
            descriptor_len: Self::DEFAULT_DESCRIPTOR_LEN,
            contour_thickness: Self::DEFAULT_CONTOUR_THICKNESS,
        }
    }
}

/// Every stage output of one pipeline run.
///
/// `contour` is `None` when the mask has no foreground; the signature and
/// descriptor are then empty.
#[derive(Debug, Clone)]
pub struct ShapeAnalysis {
    /// Polarity-corrected, closed binary mask.
    pub mask: BinaryMask,
    /// Largest-area outer boundary.
    pub contour: Option<Contour>,
    /// Centroid-relative complex boundary signal.
    pub signature: ComplexSignature,
    /// Normalized Fourier magnitudes.
    pub descriptor: Descriptor,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Errors raised at the pipeline's I/O-facing boundary.
///
/// Shape-level failures (no contour, too-short signature, incomparable
/// descriptors) are not errors; they surface as empty results or the
/// [`INVALID_DISTANCE`](crate::distance::INVALID_DISTANCE) sentinel.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A packed pixel buffer does not match the stated dimensions.
    #[error("pixel buffer holds {actual} samples, expected {expected}")]
    BufferSize {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Evaluation needs more labelled samples than were given.
    #[error("need at least 2 samples to evaluate, got {0}")]
    NotEnoughSamples(usize),
}
