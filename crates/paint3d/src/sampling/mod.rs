//! Random draws used to vary painted objects.
//!
//! The helpers here take an explicit [`Rng`] so callers decide how the
//! generator is seeded; nothing in the crate touches process-wide randomness.
use rand::Rng;

pub mod transform;

pub use transform::{JitterAxis, TransformDeltas, TransformSampler, ValueRange};

/// Number of decimals kept on sampled transform values.
pub const SAMPLE_DECIMALS: i32 = 3;

/// Generate a random float in the range [0, 1].
#[inline]
pub(crate) fn rand01(rng: &mut dyn Rng) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Round `value` to [`SAMPLE_DECIMALS`] decimal places.
#[inline]
pub fn round3(value: f32) -> f32 {
    let factor = 10f32.powi(SAMPLE_DECIMALS);
    (value * factor).round() / factor
}
