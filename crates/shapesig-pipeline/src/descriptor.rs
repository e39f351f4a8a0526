//! Spectral descriptor: Fourier magnitudes normalized by the first
//! harmonic.
//!
//! For a signature `s` of `N` samples with DFT `F`, entry `k - 1` of the
//! descriptor (for `k = 1..=K`) is `|F(k)| / |F(1)|`, or 0 once `k`
//! reaches `N`.
//!
//! - Taking magnitudes drops phase, which absorbs both the tracer's
//!   arbitrary starting point (a circular shift multiplies `F(k)` by a
//!   unit phasor) and rotation of the shape (a uniform phase factor).
//! - Dividing by `|F(1)|` cancels uniform scaling.
//! - `F(0)` is skipped: it only encodes the centroid, which the signature
//!   already placed at the origin.

use log::debug;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex32;

use crate::types::{ComplexSignature, Descriptor};

/// Descriptor length used when the caller asks for zero or fewer entries.
pub const DEFAULT_LEN: usize = 32;

/// Floor applied to `|F(1)|` before dividing by it.
pub const MIN_FIRST_HARMONIC: f32 = 1e-9;

/// Fewest complex samples the normalizer accepts.
pub const MIN_SAMPLES: usize = 2;

/// Map a caller-supplied length to the number of entries to produce.
///
/// Non-positive requests get [`DEFAULT_LEN`].
#[must_use]
pub fn resolve_len(k: i32) -> usize {
    usize::try_from(k)
        .ok()
        .filter(|&k| k > 0)
        .unwrap_or(DEFAULT_LEN)
}

/// Discrete Fourier transform of the signature (forward, unnormalized).
#[must_use]
pub fn spectrum(signature: &ComplexSignature) -> Vec<Complex32> {
    let mut buffer = signature.samples().to_vec();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

/// Compute the `len`-entry normalized descriptor of a signature.
///
/// Returns the empty descriptor when the signature has fewer than
/// [`MIN_SAMPLES`] samples or `len` is zero.
#[must_use]
pub fn normalized_descriptor(signature: &ComplexSignature, len: usize) -> Descriptor {
    let n = signature.len();
    if n < MIN_SAMPLES || len == 0 {
        debug!("signature of {n} samples is too short for a descriptor");
        return Descriptor::empty();
    }

    let spectrum = spectrum(signature);
    let first = spectrum[1].norm();
    if first < MIN_FIRST_HARMONIC {
        debug!("first harmonic magnitude {first:e} below floor");
    }
    let denom = first.max(MIN_FIRST_HARMONIC);

    Descriptor::new(
        (1..=len)
            .map(|k| spectrum.get(k).map_or(0.0, |f| f.norm() / denom))
            .collect(),
    )
}
