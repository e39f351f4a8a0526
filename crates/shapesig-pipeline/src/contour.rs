//! Contour tracing and largest-silhouette selection.
//!
//! A [`ContourTracer`] turns a binary mask into boundary polylines;
//! [`ContourTracerKind`] names the tracer in `PipelineConfig`, and
//! [`largest_contour`] keeps the one enclosing the most area.
//!
//! Only outer boundaries are traced; holes and nested regions are
//! ignored. Starting point and winding order belong to the tracer; the
//! descriptor stage does not depend on either.

use geo::Area;
use image::GrayImage;
use imageproc::contours::BorderType;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::{Contour, GridPoint};

/// Selects which contour tracing algorithm to use.
///
/// Additional variants can be added without changing the
/// `PipelineConfig` struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourTracerKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`.
    #[default]
    BorderFollowing,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary mask (non-zero pixels = foreground).
/// Output: the outer boundary of every top-level connected foreground
/// region, in the order the tracer encounters them.
pub trait ContourTracer {
    /// Trace the external contours of the given mask.
    fn trace(&self, mask: &GrayImage) -> Vec<Contour>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, mask: &GrayImage) -> Vec<Contour> {
        match *self {
            Self::BorderFollowing => trace_border_following(mask),
        }
    }
}

/// Suzuki-Abe border following, keeping only top-level outer borders.
fn trace_border_following(mask: &GrayImage) -> Vec<Contour> {
    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(mask);

    contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            Contour::new(
                c.points
                    .into_iter()
                    .map(|p| GridPoint::new(p.x, p.y))
                    .collect(),
            )
        })
        .collect()
}

/// Unsigned area enclosed by the closed contour polygon.
#[must_use]
pub fn contour_area(contour: &Contour) -> f64 {
    contour.to_polygon().unsigned_area()
}

/// Pick the contour enclosing the greatest area.
///
/// A later contour replaces the current best only when its area is
/// strictly greater, so the first-traced contour wins ties. Returns
/// `None` for an empty set.
#[must_use]
pub fn select_largest(contours: Vec<Contour>) -> Option<Contour> {
    let mut best: Option<(Contour, f64)> = None;
    for contour in contours {
        let area = contour_area(&contour);
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((contour, area)),
        }
    }
    best.map(|(contour, area)| {
        debug!(
            "selected contour with {} points, area {area:.1}",
            contour.len()
        );
        contour
    })
}

/// Trace `mask` and return its largest-area outer boundary, if any.
#[must_use]
pub fn largest_contour(mask: &GrayImage, tracer: &impl ContourTracer) -> Option<Contour> {
    let contours = tracer.trace(mask);
    debug!("traced {} external contours", contours.len());
    select_largest(contours)
}
