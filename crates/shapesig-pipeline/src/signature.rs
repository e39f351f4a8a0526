//! Centroid-relative complex boundary signal.
//!
//! Each contour point `(x, y)` becomes the complex sample
//! `(x - cx) + i(y - cy)`, where `(cx, cy)` is the area centroid of the
//! contour polygon. Subtracting the centroid makes the signal
//! translation-invariant; scale and rotation are handled by the
//! descriptor stage.

use geo::{Area, Centroid};
use log::debug;
use rustfft::num_complex::Complex32;

use crate::types::{ComplexSignature, Contour};

/// Zeroth moments at or below this magnitude count as zero area.
pub const MIN_AREA: f64 = 1e-9;

/// Area centroid of the contour polygon (first-order over zeroth-order
/// moment).
///
/// Degenerate contours (a point, a line, or any outline enclosing no
/// area) fall back to the arithmetic mean of the points. An empty contour
/// yields the origin.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(contour: &Contour) -> (f64, f64) {
    let points = contour.points();
    if points.is_empty() {
        return (0.0, 0.0);
    }

    let polygon = contour.to_polygon();
    if polygon.signed_area().abs() > MIN_AREA {
        if let Some(c) = polygon.centroid() {
            return (c.x(), c.y());
        }
    }

    debug!(
        "contour of {} points encloses no area, using point mean",
        points.len()
    );
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| {
        (sx + f64::from(p.x), sy + f64::from(p.y))
    });
    (sx / n, sy / n)
}

/// Build the complex signature of a contour, one sample per point in
/// contour order.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn complex_signature(contour: &Contour) -> ComplexSignature {
    let (cx, cy) = centroid(contour);
    ComplexSignature::new(
        contour
            .points()
            .iter()
            .map(|p| Complex32::new((f64::from(p.x) - cx) as f32, (f64::from(p.y) - cy) as f32))
            .collect(),
    )
}
