//! Euclidean distance between descriptors.
//!
//! No normalization happens here; descriptors arrive already normalized.

/// Returned by [`euclidean_distance`] when the inputs cannot be compared.
pub const INVALID_DISTANCE: f32 = -1.0;

/// Euclidean distance between two equal-length, non-empty slices.
///
/// Returns `None` when the lengths differ or either slice is empty.
#[must_use]
pub fn euclidean(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let sum: f32 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum();
    Some(sum.sqrt())
}

/// Boundary form of [`euclidean`]: absent, empty, or mismatched inputs
/// yield [`INVALID_DISTANCE`] instead of `None`.
#[must_use]
pub fn euclidean_distance(a: Option<&[f32]>, b: Option<&[f32]>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => euclidean(a, b).unwrap_or(INVALID_DISTANCE),
        _ => INVALID_DISTANCE,
    }
}
